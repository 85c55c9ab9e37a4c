//! Whole-pipeline scenarios driven by the in-memory registry.

use pretty_assertions::assert_eq;
use reflow_config::GeneratorConfig;
use reflow_core::QualifiedName;
use reflow_decl::{ApiDecl, MemoryRegistry, MethodDecl};
use reflow_gen::{GenError, Generator};
use reflow_shim::{MethodKind, ShimKind, ShimModel};
use reflow_types::TypeRef;

fn string() -> TypeRef {
    TypeRef::class("java.lang.String")
}

fn future_of(ty: TypeRef) -> TypeRef {
    TypeRef::named("io.vertx.core.Future", vec![ty])
}

fn generate_one(registry: &MemoryRegistry, name: &str) -> ShimModel {
    let config = GeneratorConfig::default();
    Generator::new(registry, &config)
        .generate_decl(&QualifiedName::new(name))
        .unwrap()
}

#[test]
fn parametric_contract_and_concrete_instantiation() {
    let mut registry = MemoryRegistry::new();
    registry.add(
        ApiDecl::new("pkg.Box")
            .contract()
            .type_param("T")
            .method(MethodDecl::new("get", TypeRef::var("T")))
            .method(MethodDecl::new("set", TypeRef::Void).param("value", TypeRef::var("T"))),
    );
    registry.add(
        ApiDecl::new("pkg.StringBox").supertype(TypeRef::named("pkg.Box", vec![string()])),
    );

    let boxed = generate_one(&registry, "pkg.Box");
    assert_eq!(boxed.kind, ShimKind::Contract);
    assert_eq!(boxed.name.as_str(), "pkg.mutiny.Box");
    assert!(boxed.fields.is_empty());
    assert!(boxed.find_method("getDelegate").unwrap().is_abstract());
    assert!(boxed.find_method("get").unwrap().is_abstract());

    // The companion carries the delegate plus exactly one witness, and the
    // accessors route values through it.
    let companion = boxed.companion.as_deref().unwrap();
    assert_eq!(companion.name.as_str(), "pkg.mutiny.BoxImpl");
    let witness_fields: Vec<_> = companion
        .fields
        .iter()
        .filter(|f| f.name.starts_with("__typeArg_"))
        .collect();
    assert_eq!(witness_fields.len(), 1);
    assert_eq!(
        companion.find_method("get").unwrap().body.as_deref(),
        Some(
            &[
                "T ret = delegate.get();".to_string(),
                "return __typeArg_0.wrap(ret);".to_string(),
            ][..]
        )
    );
    assert_eq!(
        companion.find_method("set").unwrap().body.as_deref(),
        Some(&["delegate.set(__typeArg_0.unwrap(value));".to_string()][..])
    );

    // The concrete instantiation fixes T, so no witness fields exist and
    // the inherited members convert with the substituted types.
    let string_box = generate_one(&registry, "pkg.StringBox");
    assert_eq!(string_box.kind, ShimKind::Value);
    assert!(string_box.fields.iter().all(|f| !f.name.starts_with("__typeArg_")));
    assert_eq!(
        string_box.interfaces,
        vec![TypeRef::named("pkg.mutiny.Box", vec![string()])]
    );
    let get = string_box.find_method("get").unwrap();
    assert_eq!(get.ret, string());
    assert_eq!(
        get.body.as_deref(),
        Some(&["return delegate.get();".to_string()][..])
    );
    assert_eq!(
        string_box.find_method("set").unwrap().body.as_deref(),
        Some(&["delegate.set(value);".to_string()][..])
    );
}

#[test]
fn deferred_list_of_domain_items() {
    let mut registry = MemoryRegistry::new();
    registry.add(ApiDecl::new("pkg.Refed"));
    registry.add(ApiDecl::new("pkg.Api").method(MethodDecl::new(
        "items",
        future_of(TypeRef::named("java.util.List", vec![TypeRef::class("pkg.Refed")])),
    )));

    let shim = generate_one(&registry, "pkg.Api");
    let items = shim.find_method("items").unwrap();
    assert_eq!(
        items.ret.to_string(),
        "io.smallrye.mutiny.Uni<java.util.List<pkg.mutiny.Refed>>"
    );
    assert_eq!(
        items.body.as_deref(),
        Some(
            &["return io.smallrye.mutiny.Uni.createFrom().completionStage(() -> delegate.items().toCompletionStage()).map(_r0 -> _r0 == null ? null : _r0.stream().map(_i1 -> pkg.mutiny.Refed.newInstance(_i1)).collect(java.util.stream.Collectors.toList()));".to_string()][..]
        )
    );
    assert_eq!(
        shim.find_method("itemsAndAwait").unwrap().ret.to_string(),
        "java.util.List<pkg.mutiny.Refed>"
    );
}

#[test]
fn contract_and_companion_split_for_async_members() {
    let mut registry = MemoryRegistry::new();
    registry.add(ApiDecl::new("pkg.Service").contract().method(MethodDecl::new(
        "fetch",
        future_of(string()),
    )));

    let shim = generate_one(&registry, "pkg.Service");
    for name in ["fetch", "fetchAndAwait", "fetchAndForget"] {
        assert!(shim.find_method(name).unwrap().is_abstract(), "{name}");
    }
    assert_eq!(
        shim.find_method("newInstance").unwrap().body.as_deref(),
        Some(
            &["return delegate != null ? new pkg.mutiny.ServiceImpl(delegate) : null;"
                .to_string()][..]
        )
    );

    let companion = shim.companion.as_deref().unwrap();
    assert_eq!(companion.kind, ShimKind::Value);
    assert!(!companion.find_method("fetch").unwrap().is_abstract());
    assert_eq!(
        companion.find_method("fetchAndForget").unwrap().body.as_deref(),
        Some(
            &[
                "fetch().subscribe().with(_item -> { }, _failure -> { });".to_string(),
                "return this;".to_string(),
            ][..]
        )
    );
}

#[test]
fn witness_storage_is_shared_through_a_concrete_parent() {
    let mut registry = MemoryRegistry::new();
    registry.add(
        ApiDecl::new("pkg.Base")
            .type_param("T")
            .method(MethodDecl::new("get", TypeRef::var("T"))),
    );
    registry.add(ApiDecl::new("pkg.Derived").supertype(TypeRef::named(
        "pkg.Base",
        vec![string()],
    )));

    let base = generate_one(&registry, "pkg.Base");
    let base_witnesses = base
        .fields
        .iter()
        .filter(|f| f.name.starts_with("__typeArg_"))
        .count();
    assert_eq!(base_witnesses, 1);

    // The parent shim class holds the one witness; the child forwards it
    // through `super(...)` and keeps none of its own.
    let derived = generate_one(&registry, "pkg.Derived");
    assert_eq!(
        derived.parent.as_ref().map(|p| p.to_string()),
        Some("pkg.mutiny.Base<java.lang.String>".to_string())
    );
    assert!(derived.fields.iter().all(|f| !f.name.starts_with("__typeArg_")));
    let ctor = derived
        .methods
        .iter()
        .find(|m| m.kind == MethodKind::Constructor)
        .unwrap();
    assert_eq!(
        ctor.body.as_deref().unwrap()[0],
        "super(delegate, typeArg_0);"
    );
    // Members the parent class implements are not re-emitted.
    assert!(derived.find_method("get").is_none());
}

#[test]
fn bare_identity_operations_are_not_resynthesized() {
    let mut registry = MemoryRegistry::new();
    registry.add(ApiDecl::new("pkg.Api").method(MethodDecl::new("toString", string())));

    let shim = generate_one(&registry, "pkg.Api");
    assert!(shim.find_method("toString").is_none());
    assert_eq!(
        shim.find_method("equals").unwrap().body.as_deref().unwrap()[3],
        "return delegate.equals(that.delegate);"
    );
    assert!(shim.find_method("hashCode").is_some());
}

#[test]
fn batch_succeeds_partially_when_one_declaration_is_malformed() {
    let mut registry = MemoryRegistry::new();
    registry.add(ApiDecl::new("pkg.A"));
    registry.add(ApiDecl::new("pkg.B"));
    registry.add(
        ApiDecl::new("pkg.Bad")
            .supertype(TypeRef::class("pkg.A"))
            .supertype(TypeRef::class("pkg.B")),
    );
    registry.add(ApiDecl::new("pkg.Good").method(MethodDecl::new("name", string())));

    let config = GeneratorConfig::default();
    let outcome = Generator::new(&registry, &config).generate();
    assert!(!outcome.is_complete());
    assert_eq!(outcome.shims.len(), 3);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].decl.as_str(), "pkg.Bad");
    assert!(matches!(outcome.failures[0].error, GenError::Module(_)));
    assert!(outcome
        .shims
        .iter()
        .any(|s| s.name.as_str() == "pkg.mutiny.Good"));
}

#[test]
fn generation_is_deterministic() {
    let mut registry = MemoryRegistry::new();
    registry.add(ApiDecl::new("pkg.Refed"));
    registry.add(
        ApiDecl::new("pkg.Api")
            .method(MethodDecl::new("refed", TypeRef::class("pkg.Refed")))
            .method(MethodDecl::new("fetch", future_of(string()))),
    );

    let config = GeneratorConfig::default();
    let first = Generator::new(&registry, &config).generate();
    let second = Generator::new(&registry, &config).generate();
    assert_eq!(first.shims, second.shims);
}

#[test]
fn naming_configuration_flows_through_the_whole_pass() {
    let config = GeneratorConfig::from_toml_str(
        r#"
        [naming]
        marker = "rx"
        blocking_suffix = "Blocking"
        "#,
    )
    .unwrap();
    let mut registry = MemoryRegistry::with_naming(config.naming.clone());
    registry.add(ApiDecl::new("pkg.Api").method(MethodDecl::new(
        "fetch",
        future_of(string()),
    )));

    let shim = Generator::new(&registry, &config)
        .generate_decl(&QualifiedName::new("pkg.Api"))
        .unwrap();
    assert_eq!(shim.name.as_str(), "pkg.rx.Api");
    assert!(shim.has_method("fetchBlocking"));
    assert!(!shim.has_method("fetchAndAwait"));
}
