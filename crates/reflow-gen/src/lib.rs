//! The synthesis driver.
//!
//! One [`Generator`] pass walks every domain type in the registry snapshot,
//! builds the declaration view, runs the module pipeline in its fixed
//! order, and collects finished shim models. Failures are attributed to the
//! one declaration that caused them; the batch always completes.

use reflow_config::GeneratorConfig;
use reflow_core::QualifiedName;
use reflow_decl::{DeclRegistry, DeclView};
use reflow_modules::{default_modules, GenCx, ModuleError, ShimModule};
use reflow_shim::{ShimKind, ShimModel};
use thiserror::Error;
use tracing::{debug, info_span, warn};

#[derive(Debug, Error)]
pub enum GenError {
    #[error("`{0}` is not a declaration known to the registry")]
    UnknownDecl(QualifiedName),
    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// One declaration that failed to synthesize, with the cause.
#[derive(Debug)]
pub struct DeclFailure {
    pub decl: QualifiedName,
    pub error: GenError,
}

/// Outcome of a whole-registry pass. Member-level gaps never land here;
/// they surface as diagnostics on the individual models.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub shims: Vec<ShimModel>,
    pub failures: Vec<DeclFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Generator<'a> {
    registry: &'a dyn DeclRegistry,
    config: &'a GeneratorConfig,
    modules: Vec<Box<dyn ShimModule>>,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a dyn DeclRegistry, config: &'a GeneratorConfig) -> Self {
        Self {
            registry,
            config,
            modules: default_modules(),
        }
    }

    /// Replace the compiled-in module list; order is contribution order.
    pub fn with_modules(mut self, modules: Vec<Box<dyn ShimModule>>) -> Self {
        self.modules = modules;
        self
    }

    /// Synthesize every domain type in the registry, in registry order.
    pub fn generate(&self) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for name in self.registry.domain_types() {
            let _span = info_span!("synthesize", decl = %name).entered();
            match self.generate_decl(&name) {
                Ok(shim) => outcome.shims.push(shim),
                Err(error) => {
                    warn!(%error, "declaration failed");
                    outcome.failures.push(DeclFailure { decl: name, error });
                }
            }
        }
        outcome
    }

    /// Synthesize a single declaration.
    pub fn generate_decl(&self, name: &QualifiedName) -> Result<ShimModel, GenError> {
        let decl = self
            .registry
            .decl(name)
            .ok_or_else(|| GenError::UnknownDecl(name.clone()))?;
        let cx = GenCx::new(self.registry, self.config);
        let view = DeclView::new(self.registry, &self.config.well_known, decl);
        let kind = if decl.concrete {
            ShimKind::Value
        } else {
            ShimKind::Contract
        };
        let mut shim = ShimModel::new(
            decl.name.clone(),
            self.config.naming.shim_name(&decl.name),
            kind,
            decl.type_params.clone(),
        );
        shim.doc = decl.doc.clone();
        for note in view.notes() {
            shim.diagnose(note.clone());
        }
        for module in &self.modules {
            if module.applies(&cx, &view) {
                debug!(module = module.name(), "contributing");
                module.contribute(&cx, &view, &mut shim)?;
            }
        }
        Ok(shim)
    }
}
