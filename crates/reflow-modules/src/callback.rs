//! SAM adapter for declarations that are themselves callback-shaped.
//!
//! The shim implements the same functional contract over wrapped values and
//! forwards into the bare delegate. Contract shims contribute nothing: the
//! converted supertype already carries the abstract member.

use reflow_shim::{ShimKind, ShimMethod, ShimModel};
use reflow_types::TypeRef;

use crate::{scope_for, skip_member, GenCx, ModuleError, ShimModule};
use reflow_decl::{CallbackKind, DeclView};

pub struct CallbackModule;

impl ShimModule for CallbackModule {
    fn name(&self) -> &'static str {
        "callback"
    }

    fn applies(&self, _cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        decl.callback_shape().is_some()
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
        let Some(shape) = decl.callback_shape() else {
            return Ok(());
        };
        let sam = shape.kind.method_name();
        let arg_ty = shape
            .args
            .first()
            .cloned()
            .unwrap_or_else(|| TypeRef::class("java.lang.Object"));
        let arg = match cx.converter.classify(&arg_ty) {
            Ok(class) => class,
            Err(err) => {
                skip_member(shim, sam, &err);
                return Ok(());
            }
        };
        let scope = scope_for(shim, false);
        let delegate = &cx.config.naming.delegate_field;
        let unwrapped = cx.converter.unwrap_expr(&arg, "event", scope);

        match shape.kind {
            CallbackKind::Handler | CallbackKind::Consumer => {
                shim.add_method(
                    ShimMethod::new(sam, TypeRef::Void)
                        .override_member()
                        .param("event", cx.converter.converted(&arg).boxed())
                        .line(format!("{delegate}.{sam}({unwrapped});")),
                );
                // A unit-typed callback is a bare signal; give callers a
                // zero-argument form.
                if arg_ty.qualified_name().map(|n| n.as_str())
                    == Some(cx.config.well_known.unit.as_str())
                {
                    shim.add_method(
                        ShimMethod::new(sam, TypeRef::Void)
                            .line(format!("{delegate}.{sam}(null);")),
                    );
                }
            }
            CallbackKind::Function => {
                let ret_ty = shape
                    .args
                    .get(1)
                    .cloned()
                    .unwrap_or_else(|| TypeRef::class("java.lang.Object"));
                let ret = match cx.converter.classify(&ret_ty) {
                    Ok(class) => class,
                    Err(err) => {
                        skip_member(shim, sam, &err);
                        return Ok(());
                    }
                };
                let method = ShimMethod::new(sam, cx.converter.converted(&ret).boxed())
                    .override_member()
                    .param("event", cx.converter.converted(&arg).boxed());
                let call = format!("{delegate}.{sam}({unwrapped})");
                if ret.is_passthrough() {
                    shim.add_method(method.line(format!("return {call};")));
                } else {
                    shim.add_method(
                        method
                            .line(format!("{} ret = {call};", ret_ty.erasure().boxed()))
                            .line(format!(
                                "return {};",
                                cx.converter.wrap_expr(&ret, "ret", scope)
                            )),
                    );
                }
            }
        }
        Ok(())
    }
}
