//! Iteration surface for declarations that are iterables or iterators of
//! convertible elements.

use reflow_shim::{ShimKind, ShimMethod, ShimModel};
use reflow_types::{Primitive, TypeRef};

use crate::{scope_for, skip_member, GenCx, ModuleError, ShimModule};
use reflow_decl::DeclView;

pub struct IterateModule;

impl ShimModule for IterateModule {
    fn name(&self) -> &'static str {
        "iterate"
    }

    fn applies(&self, _cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        decl.iterable_element().is_some() || decl.iterator_element().is_some()
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        if let Some(element) = decl.iterator_element() {
            self.iterator_members(cx, shim, &element);
        }
        if let Some(element) = decl.iterable_element() {
            self.iterable_members(cx, decl, shim, &element);
        }
        Ok(())
    }
}

impl IterateModule {
    /// `hasNext`/`next` for declarations that are themselves iterators.
    fn iterator_members(&self, cx: &GenCx<'_>, shim: &mut ShimModel, element: &TypeRef) {
        let item = match cx.converter.classify(element) {
            Ok(class) => class,
            Err(err) => {
                skip_member(shim, "next", &err);
                return;
            }
        };
        let abstract_members = shim.kind == ShimKind::Contract;

        let has_next = ShimMethod::new("hasNext", TypeRef::Primitive(Primitive::Boolean))
            .override_member();
        let next =
            ShimMethod::new("next", cx.converter.converted(&item).boxed()).override_member();
        if abstract_members {
            shim.add_method(has_next.abstract_member());
            shim.add_method(next.abstract_member());
            return;
        }

        let delegate = &cx.config.naming.delegate_field;
        shim.add_method(has_next.line(format!("return {delegate}.hasNext();")));
        if item.is_passthrough() {
            shim.add_method(next.line(format!("return {delegate}.next();")));
        } else {
            let scope = scope_for(shim, false);
            shim.add_method(
                next.line(format!("{} ret = {delegate}.next();", element.erasure().boxed()))
                    .line(format!(
                        "return {};",
                        cx.converter.wrap_expr(&item, "ret", scope)
                    )),
            );
        }
    }

    /// `iterator()` plus a lazy-sequence view for iterable declarations.
    fn iterable_members(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
        element: &TypeRef,
    ) {
        let item = match cx.converter.classify(element) {
            Ok(class) => class,
            Err(err) => {
                skip_member(shim, "iterator", &err);
                return;
            }
        };
        let abstract_members = shim.kind == ShimKind::Contract;
        let wrapped = cx.converter.converted(&item).boxed();

        let iterator = ShimMethod::new(
            "iterator",
            TypeRef::named(
                cx.config.well_known.iterator.as_str(),
                vec![wrapped.clone()],
            ),
        )
        .override_member();

        if abstract_members {
            shim.add_method(iterator.abstract_member());
        } else if item.is_passthrough() {
            shim.add_method(iterator.line(format!(
                "return {}.iterator();",
                cx.config.naming.delegate_field
            )));
        } else {
            let scope = scope_for(shim, false);
            let wrap = cx.converter.wrap_expr(&item, "_item", scope);
            shim.add_method(
                iterator
                    .line(format!(
                        "java.util.function.Function<{bare}, {wrapped}> _conv = _item -> {wrap};",
                        bare = element.erasure().boxed(),
                    ))
                    .line(format!(
                        "return new {}<>({}.iterator(), _conv);",
                        cx.config.target.mapping_iterator, cx.config.naming.delegate_field
                    )),
            );
        }

        // Stream declarations already expose the memoized bridge; everything
        // else gets a cold per-call view over the iterable.
        if decl.stream_element().is_none() {
            let to_multi = ShimMethod::new(
                cx.config.naming.lazy_seq_method.clone(),
                TypeRef::named(cx.config.target.lazy_seq.as_str(), vec![wrapped]),
            );
            if abstract_members {
                shim.add_method(to_multi.abstract_member());
            } else {
                shim.add_method(to_multi.line(format!(
                    "return {}.createFrom().iterable(this);",
                    cx.config.target.lazy_seq
                )));
            }
        }
    }
}
