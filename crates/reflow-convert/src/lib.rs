//! Bidirectional type-conversion model.
//!
//! Bridges "bare" asynchronous types and "wrapped" reactive types: every
//! type reaching this crate is classified into exactly one shape
//! ([`Classification`]), the wrapped signature type is computed purely
//! structurally ([`Converter::converted`]), and the runtime conversion is
//! produced as Java expression text ([`Converter::wrap_expr`] /
//! [`Converter::unwrap_expr`]) including generic-witness threading across
//! erasure boundaries.

use reflow_config::GeneratorConfig;
use reflow_core::QualifiedName;
use reflow_decl::{DeclRegistry, DomainInfo};
use reflow_types::TypeRef;
use thiserror::Error;

mod classify;
mod expr;
mod witness;

pub use classify::{
    AsyncClass, CallbackClass, Classification, ContainerClass, ContainerKind, DomainClass,
};
pub use witness::{Witness, WitnessScope, WitnessSource};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// The front-end could not resolve the referenced type; the member
    /// using it is skipped with a diagnostic, the rest of the declaration
    /// still synthesizes.
    #[error("unresolved type `{0}`")]
    Unresolved(String),
}

/// The conversion model. Purely read-only over the registry snapshot and
/// configuration; safe to share across declaration passes.
pub struct Converter<'a> {
    registry: &'a dyn DeclRegistry,
    config: &'a GeneratorConfig,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a dyn DeclRegistry, config: &'a GeneratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.config
    }

    pub fn registry(&self) -> &dyn DeclRegistry {
        self.registry
    }

    /// Whether the type has both a bare and a wrapped form.
    pub fn is_convertible_domain_type(&self, ty: &TypeRef) -> bool {
        ty.qualified_name()
            .is_some_and(|name| self.registry.is_domain_type(name))
    }

    pub fn lookup_domain(&self, name: &QualifiedName) -> Option<DomainInfo> {
        self.registry.domain_info(name)
    }
}
