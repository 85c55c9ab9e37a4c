//! Java type references for reflow.
//!
//! `TypeRef` is the resolved-type surface the front-end hands us: enough to
//! classify, substitute type arguments along a supertype path, and render a
//! source-level type string. It deliberately carries no symbol identity
//! beyond the qualified name; cross-type lookups go through the declaration
//! registry.

use std::collections::HashMap;
use std::fmt;

use reflow_core::QualifiedName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Char => "char",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// The `java.lang` box type used when this primitive appears in a
    /// generic position.
    pub fn boxed_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "java.lang.Boolean",
            Primitive::Byte => "java.lang.Byte",
            Primitive::Short => "java.lang.Short",
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Char => "java.lang.Character",
            Primitive::Float => "java.lang.Float",
            Primitive::Double => "java.lang.Double",
        }
    }
}

/// A reference to a class or interface type, with type arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamedType {
    pub name: QualifiedName,
    pub args: Vec<TypeRef>,
}

/// A resolved type reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Void,
    Primitive(Primitive),
    Named(NamedType),
    /// A type variable, referenced by its declared name.
    Var(String),
    /// A reference the front-end failed to resolve; carries the source text
    /// so diagnostics can point at it.
    Unresolved(String),
}

impl TypeRef {
    pub fn named(name: impl Into<QualifiedName>, args: Vec<TypeRef>) -> TypeRef {
        TypeRef::Named(NamedType {
            name: name.into(),
            args,
        })
    }

    pub fn class(name: impl Into<QualifiedName>) -> TypeRef {
        TypeRef::named(name, Vec::new())
    }

    pub fn var(name: impl Into<String>) -> TypeRef {
        TypeRef::Var(name.into())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            TypeRef::Named(n) => Some(n),
            _ => None,
        }
    }

    /// The qualified name, when this is a named reference.
    pub fn qualified_name(&self) -> Option<&QualifiedName> {
        self.as_named().map(|n| &n.name)
    }

    /// This type with all type arguments dropped (`List<String>` → `List`).
    pub fn erasure(&self) -> TypeRef {
        match self {
            TypeRef::Named(n) => TypeRef::class(n.name.clone()),
            other => other.clone(),
        }
    }

    /// This type as it appears in a generic position: primitives box,
    /// `void` becomes `java.lang.Void`.
    pub fn boxed(&self) -> TypeRef {
        match self {
            TypeRef::Void => TypeRef::class("java.lang.Void"),
            TypeRef::Primitive(p) => TypeRef::class(p.boxed_name()),
            other => other.clone(),
        }
    }

    /// Replace type variables per `bindings`, recursively. Unbound
    /// variables stay as they are.
    pub fn substitute(&self, bindings: &HashMap<String, TypeRef>) -> TypeRef {
        match self {
            TypeRef::Var(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            TypeRef::Named(n) => TypeRef::Named(NamedType {
                name: n.name.clone(),
                args: n.args.iter().map(|a| a.substitute(bindings)).collect(),
            }),
            other => other.clone(),
        }
    }

    /// Whether `var` occurs anywhere inside this type.
    pub fn mentions_var(&self, var: &str) -> bool {
        match self {
            TypeRef::Var(name) => name == var,
            TypeRef::Named(n) => n.args.iter().any(|a| a.mentions_var(var)),
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Primitive(p) => f.write_str(p.keyword()),
            TypeRef::Var(name) => f.write_str(name),
            TypeRef::Unresolved(text) => f.write_str(text),
            TypeRef::Named(n) => {
                f.write_str(n.name.as_str())?;
                if !n.args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in n.args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

/// Build a `T := arg` substitution map from a parameter list and an
/// argument list. A raw reference (no arguments) yields an empty map.
pub fn bindings_for(params: &[String], args: &[TypeRef]) -> HashMap<String, TypeRef> {
    params
        .iter()
        .zip(args.iter())
        .map(|(p, a)| (p.clone(), a.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_nested_generics() {
        let ty = TypeRef::named(
            "java.util.Map",
            vec![
                TypeRef::class("java.lang.String"),
                TypeRef::named("java.util.List", vec![TypeRef::var("T")]),
            ],
        );
        assert_eq!(
            ty.to_string(),
            "java.util.Map<java.lang.String, java.util.List<T>>"
        );
    }

    #[test]
    fn erasure_drops_arguments() {
        let ty = TypeRef::named("java.util.List", vec![TypeRef::var("T")]);
        assert_eq!(ty.erasure(), TypeRef::class("java.util.List"));
    }

    #[test]
    fn boxing() {
        assert_eq!(
            TypeRef::Primitive(Primitive::Int).boxed(),
            TypeRef::class("java.lang.Integer")
        );
        assert_eq!(TypeRef::Void.boxed(), TypeRef::class("java.lang.Void"));
        let named = TypeRef::class("pkg.Thing");
        assert_eq!(named.boxed(), named);
    }

    #[test]
    fn substitution_recurses() {
        let bindings = bindings_for(
            &["T".to_string()],
            &[TypeRef::class("java.lang.String")],
        );
        let ty = TypeRef::named("java.util.List", vec![TypeRef::var("T")]);
        assert_eq!(
            ty.substitute(&bindings).to_string(),
            "java.util.List<java.lang.String>"
        );
        // Unbound variables survive.
        assert_eq!(
            TypeRef::var("U").substitute(&bindings),
            TypeRef::var("U")
        );
    }

    #[test]
    fn mentions_var_walks_arguments() {
        let ty = TypeRef::named(
            "pkg.Box",
            vec![TypeRef::named("java.util.List", vec![TypeRef::var("T")])],
        );
        assert!(ty.mentions_var("T"));
        assert!(!ty.mentions_var("U"));
    }
}
