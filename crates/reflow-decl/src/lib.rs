//! Declaration model for reflow.
//!
//! The front-end (parser + symbol resolution) is an external collaborator;
//! this crate defines the resolved-declaration surface it must produce
//! (`ApiDecl` and friends), the registry contract the engine reads
//! cross-type information through (`DeclRegistry`), and a read-only view
//! (`DeclView`) that pre-digests a declaration for the module pipeline.
//!
//! `MemoryRegistry` is an in-memory `DeclRegistry` for tests and demos.

use reflow_core::QualifiedName;
use reflow_types::TypeRef;

mod registry;
mod view;

pub use registry::{DeclRegistry, DomainInfo, MemoryRegistry};
pub use view::{CallbackKind, CallbackShape, DeclView};

/// A resolved API declaration marked for shim synthesis.
///
/// Immutable for the duration of one synthesis pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiDecl {
    pub name: QualifiedName,
    /// Declared type parameters, in order.
    pub type_params: Vec<String>,
    /// Whether the type is instantiated directly (value-bearing) or only
    /// ever narrowed by a concrete descendant (contract-only).
    pub concrete: bool,
    /// Declared supertypes, in order.
    pub supertypes: Vec<TypeRef>,
    pub methods: Vec<MethodDecl>,
    pub constants: Vec<ConstantDecl>,
    pub doc: Option<String>,
}

impl ApiDecl {
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            concrete: true,
            supertypes: Vec::new(),
            methods: Vec::new(),
            constants: Vec::new(),
            doc: None,
        }
    }

    pub fn contract(mut self) -> Self {
        self.concrete = false;
        self
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn supertype(mut self, ty: TypeRef) -> Self {
        self.supertypes.push(ty);
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn constant(mut self, constant: ConstantDecl) -> Self {
        self.constants.push(constant);
        self
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// Whether the declaration itself declares a member with this name.
    pub fn declares_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }
}

/// One method of an API declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub ret: TypeRef,
    pub params: Vec<ParamDecl>,
    /// Declared thrown-failure types.
    pub throws: Vec<TypeRef>,
    pub is_static: bool,
    /// Returns the receiver for chaining; the shim returns itself instead
    /// of converting the bare return.
    pub is_fluent: bool,
    pub doc: Option<String>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, ret: TypeRef) -> Self {
        Self {
            name: name.into(),
            ret,
            params: Vec::new(),
            throws: Vec::new(),
            is_static: false,
            is_fluent: false,
            doc: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            ty,
            nullable: false,
        });
        self
    }

    pub fn nullable_param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            ty,
            nullable: true,
        });
        self
    }

    pub fn throws(mut self, ty: TypeRef) -> Self {
        self.throws.push(ty);
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn fluent(mut self) -> Self {
        self.is_fluent = true;
        self
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    /// Erased parameter types, used to compare overload candidates.
    pub fn param_erasures(&self) -> Vec<TypeRef> {
        self.params.iter().map(|p| p.ty.erasure()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
    pub nullable: bool,
}

/// A `static final` constant on the bare declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantDecl {
    pub name: String,
    pub ty: TypeRef,
    pub doc: Option<String>,
}

impl ConstantDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            doc: None,
        }
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }
}
