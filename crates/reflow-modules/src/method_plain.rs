//! Synchronous method synthesis.
//!
//! Every surviving method whose return is not the deferred shape lands
//! here. The body recipe branches on the shape of the returned value:
//! passthrough, convertible (null short-circuits through the wrap factory),
//! or container-of-convertible (element/value-wise mapping).

use reflow_convert::Classification;
use reflow_shim::{MethodKind, ShimKind, ShimMethod, ShimModel};

use crate::{convert_params, is_async_return, scope_for, skip_member, GenCx, ModuleError, ShimModule};
use reflow_decl::{DeclView, MethodDecl};

pub struct PlainMethodModule;

impl ShimModule for PlainMethodModule {
    fn name(&self) -> &'static str {
        "plain-method"
    }

    fn applies(&self, cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        decl.shim_methods().iter().any(|m| !is_async_return(cx, m))
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        for method in decl.shim_methods() {
            if is_async_return(cx, method) {
                continue;
            }
            if let Some(generated) = plain_method(cx, decl, shim, method) {
                shim.add_method(generated);
            }
        }
        Ok(())
    }
}

fn plain_method(
    cx: &GenCx<'_>,
    decl: &DeclView<'_>,
    shim: &mut ShimModel,
    method: &MethodDecl,
) -> Option<ShimMethod> {
    let scope = scope_for(shim, method.is_static);
    let ret_class = match cx.converter.classify(&method.ret) {
        Ok(class) => class,
        Err(err) => {
            skip_member(shim, &method.name, &err);
            return None;
        }
    };
    let params = match convert_params(cx, scope, method) {
        Ok(params) => params,
        Err(err) => {
            skip_member(shim, &method.name, &err);
            return None;
        }
    };

    let ret = if method.is_fluent {
        shim.self_type()
    } else {
        cx.converter.converted(&ret_class)
    };

    let mut generated = ShimMethod::new(method.name.clone(), ret).kind(if method.is_static {
        MethodKind::Static
    } else {
        MethodKind::Instance
    });
    for p in &params.sig {
        generated = generated.param(p.name.clone(), p.ty.clone());
    }
    for t in &method.throws {
        generated = generated.throws(t.clone());
    }
    if let Some(doc) = &method.doc {
        generated = generated.doc(doc.clone());
    }

    // Contract shims declare instance members abstract; bodies belong to
    // the companion (or a concrete descendant). Static members keep their
    // bodies on the contract itself.
    if shim.kind == ShimKind::Contract && !method.is_static {
        return Some(generated.abstract_member());
    }

    let receiver = if method.is_static {
        decl.name().to_string()
    } else {
        cx.config.naming.delegate_field.clone()
    };
    let call = format!("{receiver}.{}({})", method.name, params.arg_list());

    if method.is_fluent {
        return Some(generated.line(format!("{call};")).line("return this;"));
    }
    if method.ret.is_void() {
        return Some(generated.line(format!("{call};")));
    }
    if ret_class.is_passthrough() {
        return Some(generated.line(format!("return {call};")));
    }

    // Bind the bare result once; guards in the conversion expression may
    // mention it more than once. Domain returns bind erased: their type
    // arguments name wrapped parameters that do not exist on the bare side.
    let bare_ty = match &ret_class {
        Classification::Domain(_) => method.ret.erasure().to_string(),
        _ => method.ret.to_string(),
    };
    let wrapped = cx.converter.wrap_expr(&ret_class, "ret", scope);
    Some(
        generated
            .line(format!("{bare_ty} ret = {call};"))
            .line(format!("return {wrapped};")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reflow_config::GeneratorConfig;
    use reflow_core::QualifiedName;
    use reflow_decl::{ApiDecl, DeclRegistry, MemoryRegistry};
    use reflow_types::TypeRef;

    fn string() -> TypeRef {
        TypeRef::class("java.lang.String")
    }

    fn run(registry: &MemoryRegistry, name: &str, kind: ShimKind) -> ShimModel {
        let config = GeneratorConfig::default();
        let cx = GenCx::new(registry, &config);
        let decl = registry.decl(&QualifiedName::new(name)).unwrap();
        let view = DeclView::new(registry, &config.well_known, decl);
        let mut shim = ShimModel::new(
            decl.name.clone(),
            config.naming.shim_name(&decl.name),
            kind,
            decl.type_params.clone(),
        );
        for note in view.notes() {
            shim.diagnose(note.clone());
        }
        PlainMethodModule.contribute(&cx, &view, &mut shim).unwrap();
        shim
    }

    #[test]
    fn passthrough_call_through() {
        let mut registry = MemoryRegistry::new();
        registry.add(
            ApiDecl::new("pkg.Api")
                .method(MethodDecl::new("name", string()))
                .method(MethodDecl::new("close", TypeRef::Void)),
        );

        let shim = run(&registry, "pkg.Api", ShimKind::Value);
        assert_eq!(
            shim.find_method("name").unwrap().body.as_deref(),
            Some(&["return delegate.name();".to_string()][..])
        );
        assert_eq!(
            shim.find_method("close").unwrap().body.as_deref(),
            Some(&["delegate.close();".to_string()][..])
        );
    }

    #[test]
    fn convertible_return_wraps_with_null_short_circuit_in_factory() {
        let mut registry = MemoryRegistry::new();
        registry.add(ApiDecl::new("pkg.Refed"));
        registry.add(
            ApiDecl::new("pkg.Api")
                .method(MethodDecl::new("refed", TypeRef::class("pkg.Refed"))),
        );

        let shim = run(&registry, "pkg.Api", ShimKind::Value);
        let body = shim.find_method("refed").unwrap().body.clone().unwrap();
        assert_eq!(
            body,
            vec![
                "pkg.Refed ret = delegate.refed();".to_string(),
                "return pkg.mutiny.Refed.newInstance(ret);".to_string(),
            ]
        );
    }

    #[test]
    fn parameters_unwrap_before_the_delegate_call() {
        let mut registry = MemoryRegistry::new();
        registry.add(ApiDecl::new("pkg.Refed"));
        registry.add(ApiDecl::new("pkg.Api").method(
            MethodDecl::new("send", TypeRef::Void).param("value", TypeRef::class("pkg.Refed")),
        ));

        let shim = run(&registry, "pkg.Api", ShimKind::Value);
        let send = shim.find_method("send").unwrap();
        assert_eq!(send.params[0].ty.to_string(), "pkg.mutiny.Refed");
        assert_eq!(
            send.body.as_deref(),
            Some(
                &["delegate.send(value == null ? null : value.getDelegate());".to_string()][..]
            )
        );
    }

    #[test]
    fn fluent_methods_return_self() {
        let mut registry = MemoryRegistry::new();
        registry.add(
            ApiDecl::new("pkg.Api").method(
                MethodDecl::new("retry", TypeRef::class("pkg.Api"))
                    .param("times", TypeRef::Primitive(reflow_types::Primitive::Int))
                    .fluent(),
            ),
        );

        let shim = run(&registry, "pkg.Api", ShimKind::Value);
        let retry = shim.find_method("retry").unwrap();
        assert_eq!(retry.ret.to_string(), "pkg.mutiny.Api");
        assert_eq!(
            retry.body.as_deref(),
            Some(&["delegate.retry(times);".to_string(), "return this;".to_string()][..])
        );
    }

    #[test]
    fn static_methods_call_the_bare_type() {
        let mut registry = MemoryRegistry::new();
        registry.add(
            ApiDecl::new("pkg.Api")
                .method(MethodDecl::new("version", string()).static_member()),
        );

        let shim = run(&registry, "pkg.Api", ShimKind::Contract);
        let version = shim.find_method("version").unwrap();
        assert_eq!(version.kind, MethodKind::Static);
        // Static members keep bodies even on contract shims.
        assert_eq!(
            version.body.as_deref(),
            Some(&["return pkg.Api.version();".to_string()][..])
        );
    }

    #[test]
    fn contract_instance_methods_are_abstract() {
        let mut registry = MemoryRegistry::new();
        registry.add(ApiDecl::new("pkg.Api").contract().method(MethodDecl::new(
            "name",
            string(),
        )));

        let shim = run(&registry, "pkg.Api", ShimKind::Contract);
        assert!(shim.find_method("name").unwrap().is_abstract());
    }

    #[test]
    fn generic_return_uses_witness_wrap() {
        let mut registry = MemoryRegistry::new();
        registry.add(
            ApiDecl::new("pkg.Box")
                .type_param("T")
                .method(MethodDecl::new("get", TypeRef::var("T"))),
        );

        let shim = run(&registry, "pkg.Box", ShimKind::Value);
        let get = shim.find_method("get").unwrap();
        assert_eq!(get.ret, TypeRef::var("T"));
        assert_eq!(
            get.body.as_deref(),
            Some(
                &[
                    "T ret = delegate.get();".to_string(),
                    "return __typeArg_0.wrap(ret);".to_string()
                ][..]
            )
        );
    }

    #[test]
    fn unresolved_member_is_skipped_and_diagnosed() {
        let mut registry = MemoryRegistry::new();
        registry.add(
            ApiDecl::new("pkg.Api")
                .method(MethodDecl::new("bad", TypeRef::Unresolved("Gone".into())))
                .method(MethodDecl::new("good", string())),
        );

        let shim = run(&registry, "pkg.Api", ShimKind::Value);
        assert!(shim.find_method("bad").is_none());
        assert!(shim.find_method("good").is_some());
        assert_eq!(shim.diagnostics.len(), 1);
        assert_eq!(shim.diagnostics[0].member.as_deref(), Some("bad"));
    }
}
