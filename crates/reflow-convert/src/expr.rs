//! Runtime conversion expression builders.
//!
//! `wrap_expr` converts bare → wrapped, `unwrap_expr` wrapped → bare. Both
//! return Java expression text over an input expression that must be an
//! effect-free reference (parameter, local, lambda variable): null guards
//! mention the input twice, and the deferred bridge re-evaluates the input
//! under a supplier on purpose (the underlying operation must not start
//! before subscription).

use crate::{AsyncClass, CallbackClass, Classification, ContainerClass, ContainerKind, Converter};
use crate::witness::WitnessScope;
use reflow_decl::CallbackKind;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Wrap,
    Unwrap,
}

impl Direction {
    fn flip(self) -> Direction {
        match self {
            Direction::Wrap => Direction::Unwrap,
            Direction::Unwrap => Direction::Wrap,
        }
    }
}

impl Converter<'_> {
    /// Bare → wrapped conversion of `expr`.
    pub fn wrap_expr(&self, class: &Classification, expr: &str, scope: WitnessScope<'_>) -> String {
        self.convert_expr(class, expr, scope, Direction::Wrap, 0)
    }

    /// Wrapped → bare conversion of `expr`.
    pub fn unwrap_expr(
        &self,
        class: &Classification,
        expr: &str,
        scope: WitnessScope<'_>,
    ) -> String {
        self.convert_expr(class, expr, scope, Direction::Unwrap, 0)
    }

    fn convert_expr(
        &self,
        class: &Classification,
        expr: &str,
        scope: WitnessScope<'_>,
        dir: Direction,
        depth: usize,
    ) -> String {
        if class.is_passthrough() {
            return expr.to_string();
        }
        match class {
            Classification::Opaque(_) => expr.to_string(),
            Classification::Var(name) => self.var_expr(name, expr, scope, dir),
            Classification::Domain(d) => match dir {
                Direction::Wrap => {
                    let mut args = vec![expr.to_string()];
                    for w in self.witnesses_for(d, scope) {
                        args.push(self.witness_expr(&w));
                    }
                    format!(
                        "{owner}.{factory}({args})",
                        owner = d.info.shim_name,
                        factory = self.config().naming.factory,
                        args = args.join(", ")
                    )
                }
                Direction::Unwrap => format!(
                    "{expr} == null ? null : {expr}.{getter}()",
                    getter = self.config().naming.delegate_getter
                ),
            },
            Classification::Container(c) => self.container_expr(c, expr, scope, dir, depth),
            Classification::Callback(c) => self.callback_expr(c, expr, scope, dir, depth),
            Classification::Async(a) => match dir {
                Direction::Wrap => self.pending_expr(a, expr, scope, depth),
                // The bounded input shape never needs a wrapped deferred
                // value converted back to a bare one.
                Direction::Unwrap => expr.to_string(),
            },
            Classification::Stream(s) => match dir {
                Direction::Wrap => self.lazy_seq_expr(s, expr, scope, depth),
                Direction::Unwrap => expr.to_string(),
            },
            // Sink conversion is a per-declaration concern (memoized
            // subscriber accessor), not a value conversion.
            Classification::Sink(_) => expr.to_string(),
        }
    }

    fn var_expr(
        &self,
        name: &str,
        expr: &str,
        scope: WitnessScope<'_>,
        dir: Direction,
    ) -> String {
        match scope.field_for(name) {
            Some(index) => {
                let field = self.config().naming.witness_field(index);
                match dir {
                    Direction::Wrap => format!("{field}.wrap({expr})"),
                    Direction::Unwrap => format!("{field}.unwrap({expr})"),
                }
            }
            // No witness in reach: the erased value passes through.
            None => expr.to_string(),
        }
    }

    fn container_expr(
        &self,
        c: &ContainerClass,
        expr: &str,
        scope: WitnessScope<'_>,
        dir: Direction,
        depth: usize,
    ) -> String {
        let rebuilt = match c.kind {
            ContainerKind::List | ContainerKind::Set => {
                let var = format!("_i{depth}");
                let item = self.convert_expr(&c.item, &var, scope, dir, depth + 1);
                let collector = match c.kind {
                    ContainerKind::List => "toList",
                    ContainerKind::Set => "toSet",
                    ContainerKind::Map => unreachable!(),
                };
                format!(
                    "{expr}.stream().map({var} -> {item}).collect(java.util.stream.Collectors.{collector}())"
                )
            }
            ContainerKind::Map => {
                let var = format!("_e{depth}");
                let value = self.convert_expr(
                    &c.item,
                    &format!("{var}.getValue()"),
                    scope,
                    dir,
                    depth + 1,
                );
                format!(
                    "{expr}.entrySet().stream().collect(java.util.stream.Collectors.toMap(java.util.Map.Entry::getKey, {var} -> {value}))"
                )
            }
        };
        format!("{expr} == null ? null : {rebuilt}")
    }

    /// Callback shapes convert by adapting through a lambda; the argument
    /// sits in contravariant position, so its conversion direction flips.
    fn callback_expr(
        &self,
        c: &CallbackClass,
        expr: &str,
        scope: WitnessScope<'_>,
        dir: Direction,
        depth: usize,
    ) -> String {
        let var = format!("_t{depth}");
        let arg = self.convert_expr(&c.arg, &var, scope, dir.flip(), depth + 1);
        let call = format!(
            "{expr}.{method}({arg})",
            method = c.kind.method_name()
        );
        let body = match (c.kind, &c.ret) {
            (CallbackKind::Function, Some(ret)) => {
                self.convert_expr(ret, &call, scope, dir, depth + 1)
            }
            _ => call,
        };
        format!("{expr} == null ? null : {var} -> {body}")
    }

    /// Bridge a bare deferred expression into the pending-value wrapper.
    ///
    /// The bare operation is re-evaluated under a supplier so nothing runs
    /// until subscription, and the contained-value conversion is a
    /// transformation stage on the wrapper, applied per resolution.
    fn pending_expr(
        &self,
        a: &AsyncClass,
        call: &str,
        scope: WitnessScope<'_>,
        depth: usize,
    ) -> String {
        let config = self.config();
        let base = format!(
            "{pending}.createFrom().completionStage(() -> {call}.{stage}())",
            pending = config.target.pending,
            stage = config.naming.completion_stage_method
        );
        if a.item.is_passthrough() {
            return base;
        }
        let var = format!("_r{depth}");
        let mapped = self.convert_expr(&a.item, &var, scope, Direction::Wrap, depth + 1);
        format!("{base}.map({var} -> {mapped})")
    }

    /// Bridge a bare push stream into the lazy-sequence wrapper.
    pub(crate) fn lazy_seq_expr(
        &self,
        s: &AsyncClass,
        expr: &str,
        scope: WitnessScope<'_>,
        depth: usize,
    ) -> String {
        let config = self.config();
        let base = format!(
            "{helper}.toMulti({expr})",
            helper = config.target.lazy_seq_helper
        );
        if s.item.is_passthrough() {
            return base;
        }
        let var = format!("_s{depth}");
        let mapped = self.convert_expr(&s.item, &var, scope, Direction::Wrap, depth + 1);
        format!("{base}.map({var} -> {mapped})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reflow_config::GeneratorConfig;
    use reflow_decl::{ApiDecl, MemoryRegistry};
    use reflow_types::TypeRef;

    fn registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        registry.add(ApiDecl::new("pkg.Refed"));
        registry.add(ApiDecl::new("pkg.Box").contract().type_param("T"));
        registry
    }

    fn classify(conv: &Converter<'_>, ty: TypeRef) -> Classification {
        conv.classify(&ty).unwrap()
    }

    #[test]
    fn domain_wrap_and_unwrap_are_inverses_through_the_delegate() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = classify(&conv, TypeRef::class("pkg.Refed"));
        let scope = WitnessScope::static_context();

        assert_eq!(
            conv.wrap_expr(&class, "ret", scope),
            "pkg.mutiny.Refed.newInstance(ret)"
        );
        assert_eq!(
            conv.unwrap_expr(&class, "arg", scope),
            "arg == null ? null : arg.getDelegate()"
        );
    }

    #[test]
    fn raw_parametric_domain_threads_witnesses() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = classify(&conv, TypeRef::class("pkg.Box"));
        let enclosing = vec!["T".to_string()];

        assert_eq!(
            conv.wrap_expr(&class, "ret", WitnessScope::instance(&enclosing)),
            "pkg.mutiny.Box.newInstance(ret, __typeArg_0)"
        );
    }

    #[test]
    fn list_of_domain_rebuilds_elementwise_with_null_guard() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = classify(
            &conv,
            TypeRef::named("java.util.List", vec![TypeRef::class("pkg.Refed")]),
        );

        assert_eq!(
            conv.wrap_expr(&class, "ret", WitnessScope::static_context()),
            "ret == null ? null : ret.stream().map(_i0 -> pkg.mutiny.Refed.newInstance(_i0)).collect(java.util.stream.Collectors.toList())"
        );
    }

    #[test]
    fn map_converts_values_only() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = classify(
            &conv,
            TypeRef::named(
                "java.util.Map",
                vec![
                    TypeRef::class("java.lang.String"),
                    TypeRef::class("pkg.Refed"),
                ],
            ),
        );

        assert_eq!(
            conv.unwrap_expr(&class, "m", WitnessScope::static_context()),
            "m == null ? null : m.entrySet().stream().collect(java.util.stream.Collectors.toMap(java.util.Map.Entry::getKey, _e0 -> _e0.getValue() == null ? null : _e0.getValue().getDelegate()))"
        );
    }

    #[test]
    fn handler_parameter_flips_direction() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = classify(
            &conv,
            TypeRef::named("io.vertx.core.Handler", vec![TypeRef::class("pkg.Refed")]),
        );

        // Unwrapping a wrapped handler produces a bare handler that wraps
        // each event before delivery.
        assert_eq!(
            conv.unwrap_expr(&class, "handler", WitnessScope::static_context()),
            "handler == null ? null : _t0 -> handler.handle(pkg.mutiny.Refed.newInstance(_t0))"
        );
    }

    #[test]
    fn pending_bridge_defers_and_maps_lazily() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = classify(
            &conv,
            TypeRef::named(
                "io.vertx.core.Future",
                vec![TypeRef::named(
                    "java.util.List",
                    vec![TypeRef::class("pkg.Refed")],
                )],
            ),
        );

        assert_eq!(
            conv.wrap_expr(&class, "delegate.items()", WitnessScope::static_context()),
            "io.smallrye.mutiny.Uni.createFrom().completionStage(() -> delegate.items().toCompletionStage()).map(_r0 -> _r0 == null ? null : _r0.stream().map(_i1 -> pkg.mutiny.Refed.newInstance(_i1)).collect(java.util.stream.Collectors.toList()))"
        );
    }

    #[test]
    fn pending_bridge_skips_map_for_passthrough_items() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = classify(
            &conv,
            TypeRef::named(
                "io.vertx.core.Future",
                vec![TypeRef::class("java.lang.String")],
            ),
        );

        assert_eq!(
            conv.wrap_expr(&class, "delegate.fetch()", WitnessScope::static_context()),
            "io.smallrye.mutiny.Uni.createFrom().completionStage(() -> delegate.fetch().toCompletionStage())"
        );
    }

    #[test]
    fn type_variable_uses_witness_field_when_in_scope() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let conv = Converter::new(&registry, &config);
        let class = Classification::Var("T".into());
        let enclosing = vec!["T".to_string()];

        assert_eq!(
            conv.wrap_expr(&class, "v", WitnessScope::instance(&enclosing)),
            "__typeArg_0.wrap(v)"
        );
        assert_eq!(
            conv.unwrap_expr(&class, "v", WitnessScope::instance(&enclosing)),
            "__typeArg_0.unwrap(v)"
        );
        // Out of scope: identity.
        assert_eq!(
            conv.wrap_expr(&class, "v", WitnessScope::static_context()),
            "v"
        );
    }
}
