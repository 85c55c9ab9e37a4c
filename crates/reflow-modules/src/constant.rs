//! Constant re-exposure with initializer conversion.

use reflow_convert::WitnessScope;
use reflow_shim::{ShimField, ShimModel, Visibility};

use crate::{skip_member, GenCx, ModuleError, ShimModule};
use reflow_decl::DeclView;

pub struct ConstantModule;

impl ShimModule for ConstantModule {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn applies(&self, _cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        !decl.decl().constants.is_empty()
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        // Constants have no type parameters at the definition site, so
        // witness synthesis can only ever fall back to identity.
        let scope = WitnessScope::static_context();
        for constant in &decl.decl().constants {
            let class = match cx.converter.classify(&constant.ty) {
                Ok(class) => class,
                Err(err) => {
                    skip_member(shim, &constant.name, &err);
                    continue;
                }
            };
            let source = format!("{}.{}", decl.name(), constant.name);
            let initializer = cx.converter.wrap_expr(&class, &source, scope);
            let mut field = ShimField::new(constant.name.clone(), cx.converter.converted(&class))
                .visibility(Visibility::Public)
                .static_member()
                .final_member()
                .initializer(initializer);
            if let Some(doc) = &constant.doc {
                field = field.doc(doc.clone());
            }
            shim.add_field(field);
        }
        Ok(())
    }
}
