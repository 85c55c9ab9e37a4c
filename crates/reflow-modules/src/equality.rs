//! Identity forwarding: `toString`, `equals`/`hashCode`, and ordering.
//!
//! Two shims are equal exactly when their delegates are; witnesses carry no
//! identity. Contract shims contribute nothing here.

use reflow_shim::{ShimKind, ShimMethod, ShimModel};
use reflow_types::{Primitive, TypeRef};

use crate::{scope_for, skip_member, GenCx, ModuleError, ShimModule};
use reflow_decl::DeclView;

pub struct EqualityModule;

impl ShimModule for EqualityModule {
    fn name(&self) -> &'static str {
        "equality"
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
        if shim.kind == ShimKind::Contract {
            return Ok(());
        }
        // Each forwarder is suppressed when the bare declaration defines
        // that operation itself, decided independently per name.
        let bare = decl.decl();
        let delegate = &cx.config.naming.delegate_field;
        let simple = shim.simple_name().to_string();

        if !bare.declares_method("toString") {
            shim.add_method(
                ShimMethod::new("toString", TypeRef::class("java.lang.String"))
                    .override_member()
                    .line(format!("return {delegate}.toString();")),
            );
        }
        if !bare.declares_method("equals") {
            shim.add_method(
                ShimMethod::new("equals", TypeRef::Primitive(Primitive::Boolean))
                    .override_member()
                    .param("o", TypeRef::class("java.lang.Object"))
                    .line("if (this == o) return true;")
                    .line("if (o == null || getClass() != o.getClass()) return false;")
                    .line(format!("{simple} that = ({simple}) o;"))
                    .line(format!("return {delegate}.equals(that.{delegate});")),
            );
        }
        if !bare.declares_method("hashCode") {
            shim.add_method(
                ShimMethod::new("hashCode", TypeRef::Primitive(Primitive::Int))
                    .override_member()
                    .line(format!("return {delegate}.hashCode();")),
            );
        }

        if bare.declares_method("compareTo") {
            return Ok(());
        }
        if let Some(operand) = decl.comparable_arg() {
            let class = match cx.converter.classify(&operand) {
                Ok(class) => class,
                Err(err) => {
                    skip_member(shim, "compareTo", &err);
                    return Ok(());
                }
            };
            let scope = scope_for(shim, false);
            let unwrapped = cx.converter.unwrap_expr(&class, "o", scope);
            shim.add_method(
                ShimMethod::new("compareTo", TypeRef::Primitive(Primitive::Int))
                    .override_member()
                    .param("o", cx.converter.converted(&class).boxed())
                    .line(format!("return {delegate}.compareTo({unwrapped});")),
            );
        }
        Ok(())
    }
}
