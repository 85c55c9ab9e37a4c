//! Read-only, pre-digested view over one declaration.
//!
//! The module pipeline never walks the raw declaration: the view partitions
//! supertypes into in-domain vs foreign, locates the structural contracts
//! the stream/iteration/SAM modules key off, materializes methods inherited
//! from non-concrete domain supertypes (with type-argument substitution),
//! and resolves overload collisions so no two surviving candidates collide
//! on the synthesized surface.

use std::collections::{HashSet, VecDeque};

use reflow_config::WellKnown;
use reflow_core::{Diagnostic, QualifiedName};
use reflow_types::{bindings_for, NamedType, TypeRef};
use tracing::debug;

use crate::{ApiDecl, DeclRegistry, DomainInfo, MethodDecl};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackKind {
    Handler,
    Consumer,
    Function,
}

impl CallbackKind {
    /// The single abstract method of the shape.
    pub fn method_name(self) -> &'static str {
        match self {
            CallbackKind::Handler => "handle",
            CallbackKind::Consumer => "accept",
            CallbackKind::Function => "apply",
        }
    }
}

/// The SAM contract a declaration itself satisfies, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackShape {
    pub kind: CallbackKind,
    /// Instantiated type arguments of the contract (one for handler and
    /// consumer, argument + result for function).
    pub args: Vec<TypeRef>,
}

pub struct DeclView<'a> {
    registry: &'a dyn DeclRegistry,
    well_known: &'a WellKnown,
    decl: &'a ApiDecl,
    domain_supers: Vec<(NamedType, DomainInfo)>,
    foreign_supers: Vec<TypeRef>,
    methods: Vec<MethodDecl>,
    notes: Vec<Diagnostic>,
}

impl<'a> DeclView<'a> {
    pub fn new(
        registry: &'a dyn DeclRegistry,
        well_known: &'a WellKnown,
        decl: &'a ApiDecl,
    ) -> Self {
        let mut domain_supers = Vec::new();
        let mut foreign_supers = Vec::new();
        for st in &decl.supertypes {
            match st.as_named().and_then(|n| {
                registry.domain_info(&n.name).map(|info| (n.clone(), info))
            }) {
                Some(entry) => domain_supers.push(entry),
                None => foreign_supers.push(st.clone()),
            }
        }

        let mut view = Self {
            registry,
            well_known,
            decl,
            domain_supers,
            foreign_supers,
            methods: Vec::new(),
            notes: Vec::new(),
        };
        view.collect_methods();
        view
    }

    pub fn decl(&self) -> &ApiDecl {
        self.decl
    }

    pub fn name(&self) -> &QualifiedName {
        &self.decl.name
    }

    pub fn concrete(&self) -> bool {
        self.decl.concrete
    }

    pub fn type_params(&self) -> &[String] {
        &self.decl.type_params
    }

    /// Direct supertypes that are themselves domain types.
    pub fn domain_supertypes(&self) -> &[(NamedType, DomainInfo)] {
        &self.domain_supers
    }

    /// Direct supertypes outside the domain (kept opaque).
    pub fn foreign_supertypes(&self) -> &[TypeRef] {
        &self.foreign_supers
    }

    /// Methods the plain/async method modules should synthesize from:
    /// own methods plus methods materialized from non-concrete domain
    /// supertypes, minus members owned by more specific modules, with
    /// overload collisions already resolved.
    pub fn shim_methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// Diagnostics produced while digesting the declaration (dropped
    /// overload candidates). The driver attaches these to the output model.
    pub fn notes(&self) -> &[Diagnostic] {
        &self.notes
    }

    /// Instantiated type arguments of `contract` when the declaration
    /// satisfies it anywhere in its supertype graph.
    pub fn find_supertype(&self, contract: &str) -> Option<Vec<TypeRef>> {
        let mut queue: VecDeque<TypeRef> = self.decl.supertypes.iter().cloned().collect();
        let mut seen: HashSet<QualifiedName> = HashSet::new();
        while let Some(st) = queue.pop_front() {
            let Some(named) = st.as_named() else { continue };
            if named.name.as_str() == contract {
                return Some(named.args.clone());
            }
            if !seen.insert(named.name.clone()) {
                continue;
            }
            if let Some(parent) = self.registry.decl(&named.name) {
                let bindings = bindings_for(&parent.type_params, &named.args);
                for grand in &parent.supertypes {
                    queue.push_back(grand.substitute(&bindings));
                }
            }
        }
        None
    }

    /// Element type when the declaration is a push-based producer.
    pub fn stream_element(&self) -> Option<TypeRef> {
        self.contract_arg(&self.well_known.read_stream, 0)
    }

    /// Element type when the declaration is a back-pressured consumer.
    pub fn sink_element(&self) -> Option<TypeRef> {
        self.contract_arg(&self.well_known.write_stream, 0)
    }

    pub fn iterable_element(&self) -> Option<TypeRef> {
        self.contract_arg(&self.well_known.iterable, 0)
    }

    pub fn iterator_element(&self) -> Option<TypeRef> {
        self.contract_arg(&self.well_known.iterator, 0)
    }

    /// The comparison operand type when the declaration is comparable.
    pub fn comparable_arg(&self) -> Option<TypeRef> {
        self.contract_arg(&self.well_known.comparable, 0)
    }

    fn contract_arg(&self, contract: &str, index: usize) -> Option<TypeRef> {
        self.find_supertype(contract)
            .map(|args| args.into_iter().nth(index).unwrap_or_else(object))
    }

    /// The SAM shape the declaration itself satisfies, if any.
    pub fn callback_shape(&self) -> Option<CallbackShape> {
        for (kind, contract) in [
            (CallbackKind::Handler, &self.well_known.handler),
            (CallbackKind::Consumer, &self.well_known.consumer),
            (CallbackKind::Function, &self.well_known.function),
        ] {
            if let Some(args) = self.find_supertype(contract) {
                return Some(CallbackShape { kind, args });
            }
        }
        None
    }

    /// Member names owned by more specific modules than the method modules.
    fn excluded(&self, method: &MethodDecl) -> bool {
        // Equality / ordering / display are the structural-equality
        // module's to forward (or leave alone).
        if matches!(
            method.name.as_str(),
            "equals" | "hashCode" | "toString" | "compareTo"
        ) {
            return true;
        }
        if method.name == "iterator"
            && method.params.is_empty()
            && self.iterable_element().is_some()
        {
            return true;
        }
        if matches!(method.name.as_str(), "hasNext" | "next")
            && method.params.is_empty()
            && self.iterator_element().is_some()
        {
            return true;
        }
        if let Some(shape) = self.callback_shape() {
            if method.name == shape.kind.method_name() && !method.is_static {
                return true;
            }
        }
        false
    }

    fn collect_methods(&mut self) {
        let mut out: Vec<MethodDecl> = Vec::new();
        for m in &self.decl.methods {
            if !self.excluded(m) {
                out.push(m.clone());
            }
        }

        for inherited in self.inherited_methods() {
            if self.excluded(&inherited) {
                continue;
            }
            self.merge_candidate(&mut out, inherited);
        }
        self.methods = out;
    }

    /// Instance methods declared by non-concrete domain supertypes,
    /// transitively, with type arguments substituted along the path.
    ///
    /// The concrete-parent branch is skipped: the parent shim class
    /// already implements those members.
    fn inherited_methods(&self) -> Vec<MethodDecl> {
        let mut out = Vec::new();
        let mut seen: HashSet<QualifiedName> = HashSet::new();
        let mut queue: VecDeque<NamedType> = self
            .domain_supers
            .iter()
            .filter(|(_, info)| !info.concrete)
            .map(|(named, _)| named.clone())
            .collect();

        while let Some(named) = queue.pop_front() {
            if !seen.insert(named.name.clone()) {
                continue;
            }
            let Some(parent) = self.registry.decl(&named.name) else {
                continue;
            };
            let bindings = bindings_for(&parent.type_params, &named.args);
            for m in &parent.methods {
                if m.is_static {
                    continue;
                }
                let mut m = m.clone();
                m.ret = m.ret.substitute(&bindings);
                for p in &mut m.params {
                    p.ty = p.ty.substitute(&bindings);
                }
                for t in &mut m.throws {
                    *t = t.substitute(&bindings);
                }
                out.push(m);
            }
            for grand in &parent.supertypes {
                let Some(grand_named) = grand.substitute(&bindings).as_named().cloned() else {
                    continue;
                };
                let keep = self
                    .registry
                    .domain_info(&grand_named.name)
                    .is_some_and(|info| !info.concrete);
                if keep {
                    queue.push_back(grand_named);
                }
            }
        }
        out
    }

    /// Add `candidate` to `out` unless a colliding member already exists;
    /// on collision, the most specific return type wins.
    fn merge_candidate(&mut self, out: &mut Vec<MethodDecl>, candidate: MethodDecl) {
        let existing = out.iter().position(|m| {
            m.name == candidate.name && m.param_erasures() == candidate.param_erasures()
        });
        let Some(idx) = existing else {
            out.push(candidate);
            return;
        };
        if out[idx].ret == candidate.ret {
            return;
        }
        let kept_name = out[idx].ret.qualified_name().cloned();
        let cand_name = candidate.ret.qualified_name().cloned();
        match (kept_name, cand_name) {
            (Some(kept), Some(cand)) if self.is_strict_subtype(&cand, &kept) => {
                debug!(
                    decl = %self.decl.name,
                    method = %candidate.name,
                    kept = %cand,
                    dropped = %kept,
                    "overload collision: replacing with more specific return"
                );
                out[idx] = candidate;
            }
            (Some(kept), Some(cand)) if self.is_strict_subtype(&kept, &cand) => {
                debug!(
                    decl = %self.decl.name,
                    method = %candidate.name,
                    kept = %kept,
                    dropped = %cand,
                    "overload collision: keeping more specific return"
                );
            }
            _ => {
                self.notes.push(
                    Diagnostic::warning(
                        "overload-dropped",
                        format!(
                            "dropped colliding candidate `{}` returning `{}` (kept `{}`)",
                            candidate.name, candidate.ret, out[idx].ret
                        ),
                    )
                    .with_member(candidate.name.clone()),
                );
            }
        }
    }

    /// Whether `a` is a proper subtype of `b` per the declared-supertype
    /// graph. Foreign types have no known supertypes and only compare
    /// equal to themselves.
    fn is_strict_subtype(&self, a: &QualifiedName, b: &QualifiedName) -> bool {
        if a == b {
            return false;
        }
        let mut queue: VecDeque<QualifiedName> = VecDeque::from([a.clone()]);
        let mut seen = HashSet::new();
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            let Some(decl) = self.registry.decl(&name) else {
                continue;
            };
            for st in &decl.supertypes {
                if let Some(named) = st.as_named() {
                    if &named.name == b {
                        return true;
                    }
                    queue.push_back(named.name.clone());
                }
            }
        }
        false
    }
}

fn object() -> TypeRef {
    TypeRef::class("java.lang.Object")
}
