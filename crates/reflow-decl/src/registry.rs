//! Registry contract consumed from the external front-end, plus an
//! in-memory implementation for tests and demos.

use indexmap::IndexMap;
use reflow_config::Naming;
use reflow_core::QualifiedName;

use crate::ApiDecl;

/// Per-domain-type classification, computed once before any module runs so
/// the per-declaration passes only ever read it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainInfo {
    pub concrete: bool,
    /// Type parameter names of the declaration, in order. The count is the
    /// witness count of the concrete root of a hierarchy.
    pub type_params: Vec<String>,
    /// Qualified name of the synthesized shim.
    pub shim_name: QualifiedName,
    /// Qualified name of the package-visible companion (meaningful for
    /// contract-only types).
    pub companion_name: QualifiedName,
}

impl DomainInfo {
    pub fn type_param_count(&self) -> usize {
        self.type_params.len()
    }

    /// The type consumers instantiate when wrapping a bare instance.
    pub fn instantiated_name(&self) -> &QualifiedName {
        if self.concrete {
            &self.shim_name
        } else {
            &self.companion_name
        }
    }
}

/// Read-only lookup over all declarations known to one synthesis batch.
pub trait DeclRegistry {
    fn decl(&self, name: &QualifiedName) -> Option<&ApiDecl>;

    fn domain_info(&self, name: &QualifiedName) -> Option<DomainInfo>;

    fn is_domain_type(&self, name: &QualifiedName) -> bool {
        self.domain_info(name).is_some()
    }

    /// All domain types, in deterministic order.
    fn domain_types(&self) -> Vec<QualifiedName>;
}

/// In-memory registry, insertion-ordered.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    naming: Naming,
    decls: IndexMap<QualifiedName, ApiDecl>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming(naming: Naming) -> Self {
        Self {
            naming,
            decls: IndexMap::new(),
        }
    }

    pub fn add(&mut self, decl: ApiDecl) {
        self.decls.insert(decl.name.clone(), decl);
    }
}

impl DeclRegistry for MemoryRegistry {
    fn decl(&self, name: &QualifiedName) -> Option<&ApiDecl> {
        self.decls.get(name)
    }

    fn domain_info(&self, name: &QualifiedName) -> Option<DomainInfo> {
        let decl = self.decls.get(name)?;
        Some(DomainInfo {
            concrete: decl.concrete,
            type_params: decl.type_params.clone(),
            shim_name: self.naming.shim_name(&decl.name),
            companion_name: self.naming.companion_name(&decl.name),
        })
    }

    fn domain_types(&self) -> Vec<QualifiedName> {
        self.decls.keys().cloned().collect()
    }
}
