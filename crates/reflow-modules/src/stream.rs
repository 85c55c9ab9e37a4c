//! Lazy-sequence and subscriber views for declarations that are themselves
//! push streams or back-pressured sinks.
//!
//! Both views are memoized behind a synchronized accessor: the bridge is
//! built once per shim instance, on first use.

use reflow_convert::{AsyncClass, Classification};
use reflow_shim::{ShimField, ShimKind, ShimMethod, ShimModel};
use reflow_types::TypeRef;

use crate::{scope_for, skip_member, GenCx, ModuleError, ShimModule};
use reflow_decl::DeclView;

pub struct StreamModule;

impl ShimModule for StreamModule {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn applies(&self, _cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        decl.stream_element().is_some()
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        let naming = &cx.config.naming;
        let element = decl
            .stream_element()
            .unwrap_or_else(|| TypeRef::class("java.lang.Object"));
        let item = match cx.converter.classify(&element) {
            Ok(class) => class,
            Err(err) => {
                skip_member(shim, &naming.lazy_seq_method, &err);
                return Ok(());
            }
        };

        let seq_ty = TypeRef::named(
            cx.config.target.lazy_seq.as_str(),
            vec![cx.converter.converted(&item).boxed()],
        );

        if shim.kind == ShimKind::Contract {
            shim.add_method(
                ShimMethod::new(naming.lazy_seq_method.clone(), seq_ty.clone()).abstract_member(),
            );
            add_blocking_views(cx, shim, &item, true);
            return Ok(());
        }

        shim.add_field(ShimField::new("multi", seq_ty.clone()));

        let scope = scope_for(shim, false);
        let stream_class = Classification::Stream(AsyncClass {
            item_ty: element,
            item: Box::new(item.clone()),
        });
        let bridge = cx
            .converter
            .wrap_expr(&stream_class, &cx.config.naming.delegate_field, scope);
        shim.add_method(
            ShimMethod::new(naming.lazy_seq_method.clone(), seq_ty)
                .synchronized()
                .line("if (multi == null) {")
                .line(format!("  multi = {bridge};"))
                .line("}")
                .line("return multi;"),
        );
        add_blocking_views(cx, shim, &item, false);
        Ok(())
    }
}

/// Blocking iterable/stream views derived from the lazy sequence.
fn add_blocking_views(
    cx: &GenCx<'_>,
    shim: &mut ShimModel,
    item: &Classification,
    abstract_members: bool,
) {
    let naming = &cx.config.naming;
    let target = &cx.config.target;
    let converted = cx.converter.converted(item).boxed();

    let iterable = ShimMethod::new(
        naming.blocking_iterable_method.clone(),
        TypeRef::named(cx.config.well_known.iterable.as_str(), vec![converted.clone()]),
    );
    let stream = ShimMethod::new(
        naming.blocking_stream_method.clone(),
        TypeRef::named("java.util.stream.Stream", vec![converted]),
    );
    if abstract_members {
        shim.add_method(iterable.abstract_member());
        shim.add_method(stream.abstract_member());
        return;
    }
    shim.add_method(iterable.line(format!(
        "return {}().{};",
        naming.lazy_seq_method, target.lazy_seq_iterable
    )));
    shim.add_method(stream.line(format!(
        "return {}().{};",
        naming.lazy_seq_method, target.lazy_seq_stream
    )));
}

pub struct SinkModule;

impl ShimModule for SinkModule {
    fn name(&self) -> &'static str {
        "sink"
    }

    fn applies(&self, _cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool {
        decl.sink_element().is_some()
    }

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError> {
        let naming = &cx.config.naming;
        let element = decl
            .sink_element()
            .unwrap_or_else(|| TypeRef::class("java.lang.Object"));
        let item = match cx.converter.classify(&element) {
            Ok(class) => class,
            Err(err) => {
                skip_member(shim, &naming.subscriber_method, &err);
                return Ok(());
            }
        };

        let wrapped = cx.converter.converted(&item).boxed();
        let sub_ty = TypeRef::named(
            cx.config.target.subscriber.as_str(),
            vec![wrapped.clone()],
        );

        if shim.kind == ShimKind::Contract {
            shim.add_method(
                ShimMethod::new(naming.subscriber_method.clone(), sub_ty).abstract_member(),
            );
            return Ok(());
        }

        shim.add_field(ShimField::new("subscriber", sub_ty.clone()));

        let helper = &cx.config.target.subscriber_helper;
        let delegate = &naming.delegate_field;
        let mut accessor = ShimMethod::new(naming.subscriber_method.clone(), sub_ty)
            .synchronized()
            .line("if (subscriber == null) {");
        if item.is_passthrough() {
            accessor = accessor.line(format!(
                "  subscriber = {helper}.{}({delegate});",
                naming.subscriber_method
            ));
        } else {
            // Items arrive wrapped and must unwrap before hitting the bare
            // sink.
            let scope = scope_for(shim, false);
            let unwrap = cx.converter.unwrap_expr(&item, "_item", scope);
            accessor = accessor
                .line(format!(
                    "  java.util.function.Function<{wrapped}, {bare}> _conv = _item -> {unwrap};",
                    bare = element.boxed(),
                ))
                .line(format!(
                    "  subscriber = {helper}.{}({delegate}, _conv);",
                    naming.subscriber_method
                ));
        }
        shim.add_method(accessor.line("}").line("return subscriber;"));
        Ok(())
    }
}
