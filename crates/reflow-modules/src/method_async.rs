//! Deferred-result method synthesis.
//!
//! A method returning the deferred carrier becomes three members: the
//! pending-value form (lazy, nothing runs before subscription), a blocking
//! companion that awaits in place, and a fire-and-forget companion that
//! subscribes with discarding callbacks.

use reflow_convert::Classification;
use reflow_shim::{MethodKind, ShimKind, ShimMethod, ShimModel};
use reflow_types::TypeRef;

use crate::{
    convert_params, is_async_return, scope_for, skip_member, ConvertedParams, GenCx, ModuleError,
    ShimModule,
};
use reflow_decl::{DeclView, MethodDecl};

pub struct AsyncMethodModule;

impl ShimModule for AsyncMethodModule {
    fn name(&self) -> &'static str {
        "async-method"
    }

    fn applies(&self, cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        decl.shim_methods().iter().any(|m| is_async_return(cx, m))
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        for method in decl.shim_methods() {
            if !is_async_return(cx, method) {
                continue;
            }
            let scope = scope_for(shim, method.is_static);
            let ret_class = match cx.converter.classify(&method.ret) {
                Ok(class) => class,
                Err(err) => {
                    skip_member(shim, &method.name, &err);
                    continue;
                }
            };
            let params = match convert_params(cx, scope, method) {
                Ok(params) => params,
                Err(err) => {
                    skip_member(shim, &method.name, &err);
                    continue;
                }
            };

            let abstract_members = shim.kind == ShimKind::Contract && !method.is_static;
            shim.add_method(pending_method(
                cx, decl, shim, method, &ret_class, &params, abstract_members,
            ));
            shim.add_method(blocking_method(cx, method, &ret_class, &params, abstract_members));
            shim.add_method(forget_method(cx, shim, method, &params, abstract_members));
        }
        Ok(())
    }
}

fn signature(method: &MethodDecl, name: String, ret: TypeRef) -> ShimMethod {
    let mut m = ShimMethod::new(name, ret).kind(if method.is_static {
        MethodKind::Static
    } else {
        MethodKind::Instance
    });
    for t in &method.throws {
        m = m.throws(t.clone());
    }
    if let Some(doc) = &method.doc {
        m = m.doc(doc.clone());
    }
    m
}

fn with_params(mut m: ShimMethod, params: &ConvertedParams) -> ShimMethod {
    for p in &params.sig {
        m = m.param(p.name.clone(), p.ty.clone());
    }
    m
}

/// The pending-value form: same name, deferred wrapper return.
fn pending_method(
    cx: &GenCx<'_>,
    decl: &DeclView<'_>,
    shim: &ShimModel,
    method: &MethodDecl,
    ret_class: &Classification,
    params: &ConvertedParams,
    abstract_member: bool,
) -> ShimMethod {
    let ret = cx.converter.converted(ret_class);
    let generated = with_params(signature(method, method.name.clone(), ret), params);
    if abstract_member {
        return generated.abstract_member();
    }
    let receiver = if method.is_static {
        decl.name().to_string()
    } else {
        cx.config.naming.delegate_field.clone()
    };
    let call = format!("{receiver}.{}({})", method.name, params.arg_list());
    let scope = scope_for(shim, method.is_static);
    generated.line(format!(
        "return {};",
        cx.converter.wrap_expr(ret_class, &call, scope)
    ))
}

/// The blocking companion: forwards to the pending form and awaits.
fn blocking_method(
    cx: &GenCx<'_>,
    method: &MethodDecl,
    ret_class: &Classification,
    params: &ConvertedParams,
    abstract_member: bool,
) -> ShimMethod {
    let item = match ret_class {
        Classification::Async(a) => cx.converter.converted(&a.item).boxed(),
        _ => TypeRef::class("java.lang.Object"),
    };
    let name = cx.config.naming.blocking_name(&method.name);
    let generated = with_params(signature(method, name, item), params);
    if abstract_member {
        return generated.abstract_member();
    }
    generated.line(format!(
        "return {}({}).{};",
        method.name,
        params.name_list(),
        cx.config.target.pending_block
    ))
}

/// The fire-and-forget companion: subscribes with discarding callbacks and
/// returns the receiver for chaining (nothing for static members).
fn forget_method(
    cx: &GenCx<'_>,
    shim: &ShimModel,
    method: &MethodDecl,
    params: &ConvertedParams,
    abstract_member: bool,
) -> ShimMethod {
    let ret = if method.is_static {
        TypeRef::Void
    } else {
        shim.self_type()
    };
    let name = cx.config.naming.forget_name(&method.name);
    let generated = with_params(signature(method, name, ret), params);
    if abstract_member {
        return generated.abstract_member();
    }
    let generated = generated.line(format!(
        "{}({}).{};",
        method.name,
        params.name_list(),
        cx.config.target.pending_forget
    ));
    if method.is_static {
        generated
    } else {
        generated.line("return this;")
    }
}
