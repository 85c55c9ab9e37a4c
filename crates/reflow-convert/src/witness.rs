//! Runtime generic witness synthesis.
//!
//! A witness pairs wrap/unwrap functions for one erased type parameter. For
//! every conversion whose target domain type carries type parameters, one
//! witness per parameter of the *referenced* type is chosen, in this
//! precedence order:
//!
//! 1. reuse an enclosing witness field that covers that exact type
//!    parameter;
//! 2. synthesize a fresh witness closing over another domain type's
//!    wrap/unwrap;
//! 3. fall back to an identity witness.

use reflow_core::QualifiedName;
use reflow_decl::DomainInfo;
use reflow_types::TypeRef;
use tracing::trace;

use crate::{Converter, DomainClass};

/// The witness fields visible at a generation site.
#[derive(Clone, Copy, Debug)]
pub struct WitnessScope<'a> {
    /// Type parameters of the enclosing declaration, in witness-field
    /// order.
    pub type_params: &'a [String],
    /// Whether the per-instance witness fields are reachable (false in
    /// static contexts and in contract-only declarations without storage).
    pub fields_available: bool,
}

impl<'a> WitnessScope<'a> {
    pub fn instance(type_params: &'a [String]) -> Self {
        Self {
            type_params,
            fields_available: true,
        }
    }

    pub fn static_context() -> Self {
        Self {
            type_params: &[],
            fields_available: false,
        }
    }

    /// Witness field index covering a type variable, if reachable.
    pub fn field_for(&self, var: &str) -> Option<usize> {
        if !self.fields_available {
            return None;
        }
        self.type_params.iter().position(|p| p == var)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WitnessSource {
    /// Reuse the enclosing type's witness field with this index.
    Field(usize),
    /// Fresh witness closing over another domain type's wrap/unwrap.
    Domain {
        bare: QualifiedName,
        info: DomainInfo,
    },
    /// Nothing known about the parameter; wrap/unwrap are identity.
    Identity,
}

/// One synthesized witness for one type parameter of a conversion target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    pub param_name: String,
    pub source: WitnessSource,
}

impl Converter<'_> {
    /// Witnesses for a domain-type conversion site, one per type parameter
    /// of the referenced declaration (not of the enclosing method).
    pub fn witnesses_for(&self, domain: &DomainClass, scope: WitnessScope<'_>) -> Vec<Witness> {
        let mut out = Vec::with_capacity(domain.info.type_param_count());
        for (index, param_name) in domain.info.type_params.iter().enumerate() {
            // A raw reference leaves the parameter bound to the variable of
            // the same name, which is exactly what name-based field reuse
            // needs.
            let binding = domain
                .ty
                .args
                .get(index)
                .cloned()
                .unwrap_or_else(|| TypeRef::var(param_name.clone()));
            let source = self.witness_source(&binding, scope);
            trace!(
                target = %domain.ty.name,
                param = %param_name,
                ?source,
                "witness synthesis"
            );
            out.push(Witness {
                param_name: param_name.clone(),
                source,
            });
        }
        out
    }

    fn witness_source(&self, binding: &TypeRef, scope: WitnessScope<'_>) -> WitnessSource {
        match binding {
            TypeRef::Var(name) => match scope.field_for(name) {
                Some(index) => WitnessSource::Field(index),
                // Method-local type variable, or no witness storage in
                // reach: nothing to close over.
                None => WitnessSource::Identity,
            },
            TypeRef::Named(named) => match self.registry().domain_info(&named.name) {
                Some(info) => WitnessSource::Domain {
                    bare: named.name.clone(),
                    info,
                },
                None => WitnessSource::Identity,
            },
            _ => WitnessSource::Identity,
        }
    }

    /// Render one witness as a Java expression.
    pub fn witness_expr(&self, witness: &Witness) -> String {
        let config = self.config();
        let type_arg = &config.target.type_arg;
        let naming = &config.naming;
        match &witness.source {
            WitnessSource::Field(index) => naming.witness_field(*index),
            WitnessSource::Domain { bare, info } => {
                let factory_owner = &info.shim_name;
                let getter = &naming.delegate_getter;
                format!(
                    "new {type_arg}<>(o -> {factory_owner}.{factory}(({bare}) o), o -> o.{getter}())",
                    factory = naming.factory,
                )
            }
            WitnessSource::Identity => format!("{type_arg}.unknown()"),
        }
    }
}
