//! Core shared types for reflow.
//!
//! This crate is intentionally small and dependency-free.

use std::fmt;

/// A dotted, fully-qualified Java type name (`pkg.sub.Type`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last dotted segment (`Type` for `pkg.sub.Type`).
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// The package prefix, or `None` for an unqualified name.
    pub fn package(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    /// Rebuild the name under a different package.
    pub fn with_package(&self, package: &str) -> QualifiedName {
        if package.is_empty() {
            QualifiedName::new(self.simple_name())
        } else {
            QualifiedName::new(format!("{package}.{}", self.simple_name()))
        }
    }

    /// Append `segment` to the package path, keeping the simple name:
    /// `pkg.sub.Type` + `mutiny` → `pkg.sub.mutiny.Type`.
    pub fn with_package_segment(&self, segment: &str) -> QualifiedName {
        match self.package() {
            Some(pkg) => QualifiedName::new(format!("{pkg}.{segment}.{}", self.simple_name())),
            None => QualifiedName::new(format!("{segment}.{}", self.simple_name())),
        }
    }

    /// Append `suffix` to the simple name, keeping the package.
    pub fn with_name_suffix(&self, suffix: &str) -> QualifiedName {
        QualifiedName::new(format!("{}{suffix}", self.0))
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self.0)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QualifiedName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A synthesis diagnostic, attributed to a declaration and optionally to
/// one of its members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    /// Member (method/constant) name the diagnostic applies to, when the
    /// problem is member-local rather than declaration-wide.
    pub member: Option<String>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            member: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            member: None,
        }
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }
}
