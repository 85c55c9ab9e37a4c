//! Static wrap factories, and the package-visible companion class that
//! carries the value-side members of a contract-only shim.
//!
//! The factory on a contract instantiates the companion, so consumers only
//! ever name the contract. The companion is produced by running the
//! value-side modules a second time against the same declaration view.

use reflow_shim::{MethodKind, ShimKind, ShimMethod, ShimModel};
use reflow_types::TypeRef;

use crate::{
    CallbackModule, DelegateModule, EqualityModule, GenCx, IterateModule, ModuleError,
    AsyncMethodModule, PlainMethodModule, ShimModule, SinkModule, StreamModule,
};
use reflow_decl::DeclView;

pub struct CompanionModule;

impl ShimModule for CompanionModule {
    fn name(&self) -> &'static str {
        "companion"
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
        let bare = TypeRef::class(decl.name().clone());
        let instantiated = if shim.kind == ShimKind::Value {
            shim.name.clone()
        } else {
            naming.companion_name(decl.name())
        };

        // Raw factory: no static type information, identity witnesses.
        shim.add_method(
            ShimMethod::new(naming.factory.clone(), TypeRef::class(shim.name.clone()))
                .kind(MethodKind::Static)
                .param(naming.delegate_field.clone(), bare.clone())
                .line(format!(
                    "return {arg} != null ? new {instantiated}({arg}) : null;",
                    arg = naming.delegate_field
                )),
        );

        // Typed factory: one witness per type parameter.
        if !shim.type_params.is_empty() {
            let type_arg = &cx.config.target.type_arg;
            let mut factory = ShimMethod::new(naming.factory.clone(), shim.self_type())
                .kind(MethodKind::Static)
                .param(naming.delegate_field.clone(), bare.clone());
            let mut args = vec![naming.delegate_field.clone()];
            for (index, param) in shim.type_params.iter().enumerate() {
                factory = factory.type_param(param.clone()).param(
                    format!("typeArg_{index}"),
                    TypeRef::named(type_arg.as_str(), vec![TypeRef::var(param.clone())]),
                );
                args.push(format!("typeArg_{index}"));
            }
            let params = shim.type_params.join(", ");
            shim.add_method(factory.line(format!(
                "return {arg} != null ? new {instantiated}<{params}>({list}) : null;",
                arg = naming.delegate_field,
                list = args.join(", ")
            )));
        }

        if shim.kind == ShimKind::Contract {
            let mut companion = ShimModel::new(
                decl.name().clone(),
                naming.companion_name(decl.name()),
                ShimKind::Value,
                shim.type_params.clone(),
            );
            companion.interfaces.push(shim.self_type());
            for module in value_modules() {
                if module.applies(cx, decl) {
                    module.contribute(cx, decl, &mut companion)?;
                }
            }
            shim.companion = Some(Box::new(companion));
        }
        Ok(())
    }
}

/// The value-side member modules, re-run to populate a companion.
fn value_modules() -> Vec<Box<dyn ShimModule>> {
    vec![
        Box::new(DelegateModule),
        Box::new(PlainMethodModule),
        Box::new(AsyncMethodModule),
        Box::new(StreamModule),
        Box::new(SinkModule),
        Box::new(IterateModule),
        Box::new(CallbackModule),
        Box::new(EqualityModule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reflow_config::GeneratorConfig;
    use reflow_core::QualifiedName;
    use reflow_decl::{ApiDecl, DeclRegistry, MemoryRegistry, MethodDecl};

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
        CompanionModule.contribute(&cx, &view, &mut shim).unwrap();
        shim
    }

    #[test]
    fn value_shim_factory_instantiates_itself() {
        let mut registry = MemoryRegistry::new();
        registry.add(ApiDecl::new("pkg.Api"));

        let shim = run(&registry, "pkg.Api", ShimKind::Value);
        let factory = shim.find_method("newInstance").unwrap();
        assert_eq!(factory.kind, MethodKind::Static);
        assert_eq!(
            factory.body.as_deref(),
            Some(
                &["return delegate != null ? new pkg.mutiny.Api(delegate) : null;".to_string()][..]
            )
        );
        assert!(shim.companion.is_none());
    }

    #[test]
    fn parametric_shim_gets_raw_and_typed_factories() {
        let mut registry = MemoryRegistry::new();
        registry.add(ApiDecl::new("pkg.Box").type_param("T"));

        let shim = run(&registry, "pkg.Box", ShimKind::Value);
        let factories: Vec<_> = shim
            .methods
            .iter()
            .filter(|m| m.name == "newInstance")
            .collect();
        assert_eq!(factories.len(), 2);

        let raw = factories[0];
        assert_eq!(raw.ret, TypeRef::class("pkg.mutiny.Box"));
        assert_eq!(raw.params.len(), 1);

        let typed = factories[1];
        assert_eq!(typed.type_params, vec!["T".to_string()]);
        assert_eq!(typed.ret.to_string(), "pkg.mutiny.Box<T>");
        assert_eq!(
            typed.params[1].ty.to_string(),
            "io.smallrye.mutiny.vertx.TypeArg<T>"
        );
        assert_eq!(
            typed.body.as_deref(),
            Some(
                &["return delegate != null ? new pkg.mutiny.Box<T>(delegate, typeArg_0) : null;"
                    .to_string()][..]
            )
        );
    }

    #[test]
    fn contract_factory_instantiates_the_companion() {
        let mut registry = MemoryRegistry::new();
        registry.add(ApiDecl::new("pkg.Api").contract().method(MethodDecl::new(
            "name",
            TypeRef::class("java.lang.String"),
        )));

        let shim = run(&registry, "pkg.Api", ShimKind::Contract);
        assert_eq!(
            shim.find_method("newInstance").unwrap().body.as_deref(),
            Some(
                &["return delegate != null ? new pkg.mutiny.ApiImpl(delegate) : null;"
                    .to_string()][..]
            )
        );

        let companion = shim.companion.as_deref().unwrap();
        assert_eq!(companion.name.as_str(), "pkg.mutiny.ApiImpl");
        assert_eq!(companion.kind, ShimKind::Value);
        assert_eq!(
            companion.interfaces,
            vec![TypeRef::class("pkg.mutiny.Api")]
        );
        // Value-side members materialize on the companion.
        assert!(companion.fields.iter().any(|f| f.name == "delegate"));
        assert_eq!(
            companion.find_method("name").unwrap().body.as_deref(),
            Some(&["return delegate.name();".to_string()][..])
        );
        assert!(companion.has_method("equals"));
    }

    #[test]
    fn parametric_contract_companion_carries_witnesses() {
        let mut registry = MemoryRegistry::new();
        registry.add(
            ApiDecl::new("pkg.Box")
                .contract()
                .type_param("T")
                .method(MethodDecl::new("get", TypeRef::var("T"))),
        );

        let shim = run(&registry, "pkg.Box", ShimKind::Contract);
        let companion = shim.companion.as_deref().unwrap();
        assert!(companion.fields.iter().any(|f| f.name == "__typeArg_0"));
        assert_eq!(
            companion.find_method("get").unwrap().body.as_deref(),
            Some(
                &[
                    "T ret = delegate.get();".to_string(),
                    "return __typeArg_0.wrap(ret);".to_string(),
                ][..]
            )
        );
    }
}
