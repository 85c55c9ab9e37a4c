//! Supertype placement: implemented interface vs parent class.

use reflow_shim::ShimModel;
use reflow_types::{NamedType, TypeRef};
use tracing::debug;

use crate::{GenCx, ModuleError, ShimModule};
use reflow_decl::DeclView;

pub struct HierarchyModule;

impl ShimModule for HierarchyModule {
    fn name(&self) -> &'static str {
        "hierarchy"
    }

    fn applies(&self, _cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        !decl.domain_supertypes().is_empty() || !decl.foreign_supertypes().is_empty()
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        let mut parent: Option<NamedType> = None;

        for (named, info) in decl.domain_supertypes() {
            let shim_super = TypeRef::named(
                info.shim_name.clone(),
                converted_args(cx, &named.args),
            );
            if info.concrete {
                if let Some(first) = &parent {
                    return Err(ModuleError::ConflictingParents {
                        decl: decl.name().clone(),
                        first: first.name.clone(),
                        second: named.name.clone(),
                    });
                }
                debug!(shim = %shim.name, parent = %shim_super, "parent class");
                parent = Some(named.clone());
                shim.parent = Some(shim_super);
            } else {
                shim.interfaces.push(shim_super);
            }
        }

        // Foreign supertypes stay nominal but their type arguments convert,
        // so `Iterable<Refed>` becomes `Iterable<mutiny.Refed>` on the shim.
        for st in decl.foreign_supertypes() {
            let converted = match st.as_named() {
                Some(named) => {
                    TypeRef::named(named.name.clone(), converted_args(cx, &named.args))
                }
                None => st.clone(),
            };
            shim.interfaces.push(converted);
        }

        Ok(())
    }
}

fn converted_args(cx: &GenCx<'_>, args: &[TypeRef]) -> Vec<TypeRef> {
    args.iter()
        .map(|a| {
            cx.converter
                .converted_type(a)
                .unwrap_or_else(|_| a.clone())
                .boxed()
        })
        .collect()
}
