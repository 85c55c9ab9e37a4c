//! Delegate storage and accessor, plus per-type-parameter witness fields.

use reflow_shim::{ShimField, ShimKind, ShimMethod, ShimModel, Visibility};
use reflow_types::TypeRef;

use crate::{GenCx, ModuleError, ShimModule};
use reflow_decl::DeclView;

pub struct DelegateModule;

/// The bare type as stored/returned by the shim. Erased when the source is
/// parametric: the bare type parameters are the unwrapped ones and cannot
/// be named from the wrapped surface.
fn bare_type(decl: &DeclView<'_>) -> TypeRef {
    TypeRef::class(decl.name().clone())
}

impl ShimModule for DelegateModule {
    fn name(&self) -> &'static str {
        "delegate"
    }

    fn applies(&self, _cx: &GenCx<'_>, _decl: &DeclView<'_>) -> bool {
        true
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        let naming = &cx.config.naming;
        let bare = bare_type(decl);
        let type_arg = &cx.config.target.type_arg;

        if shim.kind == ShimKind::Contract {
            // Interfaces carry no delegate state; a concrete descendant or
            // the companion satisfies this per instantiation.
            shim.add_method(
                ShimMethod::new(naming.delegate_getter.clone(), bare).abstract_member(),
            );
            return Ok(());
        }

        // A concrete domain parent already owns the witness storage, so the
        // child carries none of its own and every constructor chains through
        // `super(...)`, forwarding one witness per parent type argument. The
        // delegate is re-declared at the narrower bare type (shadowing the
        // parent's, same object) so child members and the covariant accessor
        // see the subtype.
        if let Some((parent, _)) = decl
            .domain_supertypes()
            .iter()
            .find(|(_, info)| info.concrete)
        {
            shim.add_field(
                ShimField::new(naming.delegate_field.clone(), bare.clone())
                    .visibility(Visibility::Private)
                    .final_member(),
            );

            let mut ctor = ShimMethod::constructor(shim.simple_name())
                .param(naming.delegate_field.clone(), bare.clone());
            let mut args = vec![naming.delegate_field.clone()];
            for (index, arg) in parent.args.iter().enumerate() {
                let wrapped = cx
                    .converter
                    .converted_type(arg)
                    .unwrap_or_else(|_| arg.clone())
                    .boxed();
                ctor = ctor.param(
                    format!("typeArg_{index}"),
                    TypeRef::named(type_arg.as_str(), vec![wrapped]),
                );
                args.push(format!("typeArg_{index}"));
            }
            shim.add_method(
                ctor.line(format!("super({});", args.join(", "))).line(format!(
                    "this.{field} = {field};",
                    field = naming.delegate_field
                )),
            );

            if !parent.args.is_empty() {
                // Chains to the parent's identity-witness convenience form.
                shim.add_method(
                    ShimMethod::constructor(shim.simple_name())
                        .param(naming.delegate_field.clone(), bare.clone())
                        .line(format!("super({});", naming.delegate_field))
                        .line(format!(
                            "this.{field} = {field};",
                            field = naming.delegate_field
                        )),
                );
            }

            shim.add_method(
                ShimMethod::new(naming.delegate_getter.clone(), bare)
                    .override_member()
                    .line(format!("return {};", naming.delegate_field)),
            );
            return Ok(());
        }

        shim.add_field(
            ShimField::new(naming.delegate_field.clone(), bare.clone())
                .visibility(Visibility::Private)
                .final_member(),
        );

        let witnesses: Vec<ShimField> = shim
            .type_params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                ShimField::new(
                    naming.witness_field(index),
                    TypeRef::named(type_arg.as_str(), vec![TypeRef::var(param.clone())]),
                )
                .visibility(Visibility::Public)
                .final_member()
            })
            .collect();
        for field in witnesses {
            shim.add_field(field);
        }

        // Full constructor: delegate plus one witness per type parameter.
        let mut ctor = ShimMethod::constructor(shim.simple_name())
            .param(naming.delegate_field.clone(), bare.clone())
            .line(format!(
                "this.{field} = {field};",
                field = naming.delegate_field
            ));
        for (index, param) in shim.type_params.iter().enumerate() {
            ctor = ctor
                .param(
                    format!("typeArg_{index}"),
                    TypeRef::named(type_arg.as_str(), vec![TypeRef::var(param.clone())]),
                )
                .line(format!(
                    "this.{field} = typeArg_{index};",
                    field = naming.witness_field(index)
                ));
        }
        shim.add_method(ctor);

        // Convenience constructor with identity witnesses, used when the
        // caller has no static type information left.
        if !shim.type_params.is_empty() {
            let mut raw = ShimMethod::constructor(shim.simple_name())
                .param(naming.delegate_field.clone(), bare.clone())
                .line(format!(
                    "this.{field} = {field};",
                    field = naming.delegate_field
                ));
            for index in 0..shim.type_params.len() {
                raw = raw.line(format!(
                    "this.{field} = {type_arg}.unknown();",
                    field = naming.witness_field(index)
                ));
            }
            shim.add_method(raw);
        }

        shim.add_method(
            ShimMethod::new(naming.delegate_getter.clone(), bare).line(format!(
                "return {};",
                naming.delegate_field
            )),
        );
        Ok(())
    }
}
