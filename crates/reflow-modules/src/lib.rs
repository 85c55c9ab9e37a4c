//! The shim module pipeline.
//!
//! Each module is an independent analyzer over the declaration view: an
//! applicability predicate plus a contribution step that appends members to
//! the output model. The driver owns the fixed iteration order
//! ([`default_modules`]); there is no dynamic loading.

use reflow_config::GeneratorConfig;
use reflow_convert::{ClassifyError, Classification, Converter, WitnessScope};
use reflow_core::{Diagnostic, QualifiedName};
use reflow_decl::{DeclRegistry, DeclView, MethodDecl};
use reflow_shim::{ShimKind, ShimModel, ShimParam};
use thiserror::Error;

mod callback;
mod companion;
mod constant;
mod delegate;
mod equality;
mod hierarchy;
mod iterate;
mod method_async;
mod method_plain;
mod stream;

pub use callback::CallbackModule;
pub use companion::CompanionModule;
pub use constant::ConstantModule;
pub use delegate::DelegateModule;
pub use equality::EqualityModule;
pub use hierarchy::HierarchyModule;
pub use iterate::IterateModule;
pub use method_async::AsyncMethodModule;
pub use method_plain::PlainMethodModule;
pub use stream::{SinkModule, StreamModule};

/// A whole-declaration structural violation; aborts synthesis of the one
/// declaration it names, never the batch.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error(
        "`{decl}` declares more than one concrete domain supertype \
         (`{first}` and `{second}`); a domain type has at most one parent class"
    )]
    ConflictingParents {
        decl: QualifiedName,
        first: QualifiedName,
        second: QualifiedName,
    },
}

/// Read-only generator state shared by every module in one pass: the
/// registry snapshot, the configuration, and the conversion model built
/// over both. Constructed once before any module runs.
pub struct GenCx<'a> {
    pub registry: &'a dyn DeclRegistry,
    pub config: &'a GeneratorConfig,
    pub converter: Converter<'a>,
}

impl<'a> GenCx<'a> {
    pub fn new(registry: &'a dyn DeclRegistry, config: &'a GeneratorConfig) -> Self {
        Self {
            registry,
            config,
            converter: Converter::new(registry, config),
        }
    }
}

/// One rule of the pipeline.
pub trait ShimModule {
    fn name(&self) -> &'static str;

    fn applies(&self, cx: &GenCx<'_>, decl: &DeclView<'_>) -> bool;

    fn contribute(
        &self,
        cx: &GenCx<'_>,
        decl: &DeclView<'_>,
        shim: &mut ShimModel,
    ) -> Result<(), ModuleError>;
}

/// The compiled-in module list, in contribution order.
pub fn default_modules() -> Vec<Box<dyn ShimModule>> {
    vec![
        Box::new(HierarchyModule),
        Box::new(DelegateModule),
        Box::new(ConstantModule),
        Box::new(PlainMethodModule),
        Box::new(AsyncMethodModule),
        Box::new(StreamModule),
        Box::new(SinkModule),
        Box::new(IterateModule),
        Box::new(CallbackModule),
        Box::new(EqualityModule),
        Box::new(CompanionModule),
    ]
}

/// The witness fields reachable from a generation site on `shim`.
fn scope_for<'s>(shim: &'s ShimModel, is_static: bool) -> WitnessScope<'s> {
    if shim.kind == ShimKind::Value && !is_static {
        WitnessScope::instance(&shim.type_params)
    } else {
        WitnessScope::static_context()
    }
}

/// Converted parameter signature plus the argument expressions handed to
/// the delegate call.
struct ConvertedParams {
    sig: Vec<ShimParam>,
    args: Vec<String>,
}

impl ConvertedParams {
    fn arg_list(&self) -> String {
        self.args.join(", ")
    }

    /// Parameter names, for forwarding calls between generated methods.
    fn name_list(&self) -> String {
        self.sig
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn convert_params(
    cx: &GenCx<'_>,
    scope: WitnessScope<'_>,
    method: &MethodDecl,
) -> Result<ConvertedParams, ClassifyError> {
    let mut sig = Vec::with_capacity(method.params.len());
    let mut args = Vec::with_capacity(method.params.len());
    for p in &method.params {
        let class = cx.converter.classify(&p.ty)?;
        sig.push(ShimParam::new(
            p.name.clone(),
            cx.converter.converted(&class),
        ));
        args.push(cx.converter.unwrap_expr(&class, &p.name, scope));
    }
    Ok(ConvertedParams { sig, args })
}

/// Record a member-level classification failure and move on; the rest of
/// the declaration still synthesizes.
fn skip_member(shim: &mut ShimModel, member: &str, err: &ClassifyError) {
    tracing::warn!(shim = %shim.name, member, %err, "skipping member");
    shim.diagnose(
        Diagnostic::error("unresolved-type", err.to_string()).with_member(member.to_string()),
    );
}

/// Whether the method's return classifies as a deferred single result
/// (splitting the plain and async buckets). Classification failures are
/// reported by whichever bucket claims the method.
fn is_async_return(cx: &GenCx<'_>, method: &MethodDecl) -> bool {
    matches!(
        cx.converter.classify(&method.ret),
        Ok(Classification::Async(_))
    )
}
