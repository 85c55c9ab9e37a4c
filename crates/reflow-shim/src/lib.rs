//! Output type model: the shim being assembled.
//!
//! One `ShimModel` is created per source declaration at the start of a
//! pass, mutated additively by every accepting module, and handed once to
//! the external printer through the [`MemberSink`] append contract. Method
//! bodies are ordered Java statement lines; the layout backend owns
//! everything beyond member ordering.

use reflow_core::{Diagnostic, QualifiedName};
use reflow_types::TypeRef;

/// Whether the shim is a value-bearing class or a pure contract, derived
/// from the source declaration's concreteness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShimKind {
    Value,
    Contract,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Package,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimField {
    pub name: String,
    pub ty: TypeRef,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    /// Java initializer expression, when initialized at the declaration.
    pub initializer: Option<String>,
    pub doc: Option<String>,
}

impl ShimField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            initializer: None,
            doc: None,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn final_member(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn initializer(mut self, expr: impl Into<String>) -> Self {
        self.initializer = Some(expr.into());
        self
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Instance,
    Static,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimParam {
    pub name: String,
    pub ty: TypeRef,
}

impl ShimParam {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimMethod {
    pub name: String,
    pub kind: MethodKind,
    pub visibility: Visibility,
    /// Method-level type parameters (static factories of parametric shims).
    pub type_params: Vec<String>,
    pub params: Vec<ShimParam>,
    /// Ignored for constructors.
    pub ret: TypeRef,
    pub throws: Vec<TypeRef>,
    /// Ordered statement lines; `None` declares the method abstract.
    pub body: Option<Vec<String>>,
    /// Memoized accessors use one synchronized init-once slot.
    pub is_synchronized: bool,
    pub is_override: bool,
    pub doc: Option<String>,
}

impl ShimMethod {
    pub fn new(name: impl Into<String>, ret: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Instance,
            visibility: Visibility::Public,
            type_params: Vec::new(),
            params: Vec::new(),
            ret,
            throws: Vec::new(),
            body: Some(Vec::new()),
            is_synchronized: false,
            is_override: false,
            doc: None,
        }
    }

    pub fn constructor(owner_simple_name: &str) -> Self {
        let mut m = Self::new(owner_simple_name, TypeRef::Void);
        m.kind = MethodKind::Constructor;
        m
    }

    pub fn kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ShimParam::new(name, ty));
        self
    }

    pub fn throws(mut self, ty: TypeRef) -> Self {
        self.throws.push(ty);
        self
    }

    pub fn abstract_member(mut self) -> Self {
        self.body = None;
        self
    }

    pub fn synchronized(mut self) -> Self {
        self.is_synchronized = true;
        self
    }

    pub fn override_member(mut self) -> Self {
        self.is_override = true;
        self
    }

    pub fn line(mut self, statement: impl Into<String>) -> Self {
        self.body.get_or_insert_with(Vec::new).push(statement.into());
        self
    }

    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }
}

/// The printer backend's append contract. Members arrive in the order the
/// pipeline contributed them.
pub trait MemberSink {
    fn append_field(&mut self, field: &ShimField);
    fn append_method(&mut self, method: &ShimMethod);
}

/// The synthesized type being assembled for one source declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimModel {
    pub source: QualifiedName,
    pub name: QualifiedName,
    pub kind: ShimKind,
    pub type_params: Vec<String>,
    /// At most one parent class.
    pub parent: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<ShimField>,
    pub methods: Vec<ShimMethod>,
    /// Package-visible concrete implementation generated for contract-only
    /// shims.
    pub companion: Option<Box<ShimModel>>,
    /// Member-level synthesis diagnostics (skipped members, dropped
    /// overloads). The declaration still produced a usable model.
    pub diagnostics: Vec<Diagnostic>,
    pub doc: Option<String>,
}

impl ShimModel {
    pub fn new(
        source: QualifiedName,
        name: QualifiedName,
        kind: ShimKind,
        type_params: Vec<String>,
    ) -> Self {
        Self {
            source,
            name,
            kind,
            type_params,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            companion: None,
            diagnostics: Vec::new(),
            doc: None,
        }
    }

    /// This shim's own type, parameterized by its type parameters.
    pub fn self_type(&self) -> TypeRef {
        TypeRef::named(
            self.name.clone(),
            self.type_params.iter().map(TypeRef::var).collect(),
        )
    }

    pub fn simple_name(&self) -> &str {
        self.name.simple_name()
    }

    pub fn add_field(&mut self, field: ShimField) {
        self.fields.push(field);
    }

    pub fn add_method(&mut self, method: ShimMethod) {
        self.methods.push(method);
    }

    pub fn find_method(&self, name: &str) -> Option<&ShimMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.find_method(name).is_some()
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Stream all members to the printer in contribution order.
    pub fn write_members(&self, sink: &mut dyn MemberSink) {
        for field in &self.fields {
            sink.append_field(field);
        }
        for method in &self.methods {
            sink.append_method(method);
        }
    }
}
