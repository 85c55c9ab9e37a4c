//! Generator configuration for reflow.
//!
//! Everything the engine compares qualified names against — the bare async
//! carrier types, the reactive target types, and the naming contract of the
//! generated surface — lives here, loadable from TOML with serde defaults.
//! The defaults target Vert.x-style callback APIs and SmallRye Mutiny as
//! the reactive surface, but nothing outside this crate hard-codes either.

use std::path::Path;

use reflow_core::QualifiedName;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid generator config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Qualified names of the *bare* carrier types the engine recognizes
/// structurally (deferred results, streams, callbacks, collections).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WellKnown {
    /// Deferred single-result type (`Future<T>`).
    pub future: String,
    /// Push-based multi-value producer (`ReadStream<T>`).
    pub read_stream: String,
    /// Back-pressured consumer (`WriteStream<T>`).
    pub write_stream: String,
    /// Single-argument callback (`Handler<T>`).
    pub handler: String,
    pub consumer: String,
    pub function: String,
    pub iterable: String,
    pub iterator: String,
    pub list: String,
    pub set: String,
    pub map: String,
    pub comparable: String,
    /// Boxed unit type; `Handler<Void>` additionally gets a zero-argument
    /// adapter.
    pub unit: String,
}

impl Default for WellKnown {
    fn default() -> Self {
        Self {
            future: "io.vertx.core.Future".into(),
            read_stream: "io.vertx.core.streams.ReadStream".into(),
            write_stream: "io.vertx.core.streams.WriteStream".into(),
            handler: "io.vertx.core.Handler".into(),
            consumer: "java.util.function.Consumer".into(),
            function: "java.util.function.Function".into(),
            iterable: "java.lang.Iterable".into(),
            iterator: "java.util.Iterator".into(),
            list: "java.util.List".into(),
            set: "java.util.Set".into(),
            map: "java.util.Map".into(),
            comparable: "java.lang.Comparable".into(),
            unit: "java.lang.Void".into(),
        }
    }
}

/// Qualified names of the reactive target types the generated code
/// references.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Target {
    /// Pending-value wrapper replacing the deferred carrier.
    pub pending: String,
    /// Lazy-sequence wrapper replacing the push stream.
    pub lazy_seq: String,
    /// Subscriber wrapper replacing the back-pressured sink.
    pub subscriber: String,
    /// Runtime generic witness type (wrap/unwrap pair per erased type
    /// parameter).
    pub type_arg: String,
    /// Helper building a lazy sequence from a bare read stream.
    pub lazy_seq_helper: String,
    /// Helper building a subscriber from a bare write stream.
    pub subscriber_helper: String,
    /// Iterator adapter applying an element conversion.
    pub mapping_iterator: String,
    /// Call chain blocking on a pending value (`uni.<chain>`).
    pub pending_block: String,
    /// Call chain subscribing to a pending value and discarding the
    /// outcome, failures included.
    pub pending_forget: String,
    /// Call chain turning a lazy sequence into a blocking iterable.
    pub lazy_seq_iterable: String,
    /// Call chain turning a lazy sequence into a blocking stream.
    pub lazy_seq_stream: String,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            pending: "io.smallrye.mutiny.Uni".into(),
            lazy_seq: "io.smallrye.mutiny.Multi".into(),
            subscriber: "io.smallrye.mutiny.vertx.WriteStreamSubscriber".into(),
            type_arg: "io.smallrye.mutiny.vertx.TypeArg".into(),
            lazy_seq_helper: "io.smallrye.mutiny.vertx.MultiHelper".into(),
            subscriber_helper: "io.smallrye.mutiny.vertx.MultiHelper".into(),
            mapping_iterator: "io.smallrye.mutiny.vertx.MappingIterator".into(),
            pending_block: "await().indefinitely()".into(),
            pending_forget: "subscribe().with(_item -> { }, _failure -> { })".into(),
            lazy_seq_iterable: "subscribe().asIterable()".into(),
            lazy_seq_stream: "subscribe().asStream()".into(),
        }
    }
}

/// The naming contract of the generated surface. Consumers of the generated
/// code rely on these (delegate accessor, witness field prefix, suffixes),
/// so they are configuration rather than string literals in the emitters.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Naming {
    /// Package segment inserted before the simple name:
    /// `pkg.sub.Type` → `pkg.sub.<marker>.Type`.
    pub marker: String,
    pub delegate_field: String,
    pub delegate_getter: String,
    /// Witness fields are `<prefix>0 .. <prefix>{n-1}`.
    pub witness_prefix: String,
    /// Suffix of the block-until-resolved companion of an async method.
    pub blocking_suffix: String,
    /// Suffix of the trigger-and-discard companion of an async method.
    pub forget_suffix: String,
    /// Static wrap-a-bare-instance factory.
    pub factory: String,
    /// Simple-name suffix of the package-visible companion class generated
    /// for contract-only shims.
    pub companion_suffix: String,
    /// Memoized conversion to the lazy-sequence wrapper.
    pub lazy_seq_method: String,
    /// Memoized conversion to the subscriber wrapper.
    pub subscriber_method: String,
    /// Blocking iterable view derived from the lazy sequence.
    pub blocking_iterable_method: String,
    /// Blocking stream view derived from the lazy sequence.
    pub blocking_stream_method: String,
    /// Method adapting the bare deferred carrier to a completion stage.
    pub completion_stage_method: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            marker: "mutiny".into(),
            delegate_field: "delegate".into(),
            delegate_getter: "getDelegate".into(),
            witness_prefix: "__typeArg_".into(),
            blocking_suffix: "AndAwait".into(),
            forget_suffix: "AndForget".into(),
            factory: "newInstance".into(),
            companion_suffix: "Impl".into(),
            lazy_seq_method: "toMulti".into(),
            subscriber_method: "toSubscriber".into(),
            blocking_iterable_method: "blockingIterable".into(),
            blocking_stream_method: "blockingStream".into(),
            completion_stage_method: "toCompletionStage".into(),
        }
    }
}

impl Naming {
    /// Target qualified name for a source declaration.
    pub fn shim_name(&self, source: &QualifiedName) -> QualifiedName {
        source.with_package_segment(&self.marker)
    }

    /// Companion class name for a contract-only shim.
    pub fn companion_name(&self, source: &QualifiedName) -> QualifiedName {
        self.shim_name(source).with_name_suffix(&self.companion_suffix)
    }

    pub fn witness_field(&self, index: usize) -> String {
        format!("{}{index}", self.witness_prefix)
    }

    pub fn blocking_name(&self, method: &str) -> String {
        format!("{method}{}", self.blocking_suffix)
    }

    pub fn forget_name(&self, method: &str) -> String {
        format!("{method}{}", self.forget_suffix)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub well_known: WellKnown,
    pub target: Target,
    pub naming: Naming,
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_complete() {
        let config = GeneratorConfig::default();
        assert_eq!(config.naming.marker, "mutiny");
        assert_eq!(config.well_known.future, "io.vertx.core.Future");
        assert_eq!(config.target.pending, "io.smallrye.mutiny.Uni");
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            [naming]
            marker = "reactivex"
            blocking_suffix = "Blocking"

            [well_known]
            future = "com.acme.async.Promise"
            "#,
        )
        .unwrap();
        assert_eq!(config.naming.marker, "reactivex");
        assert_eq!(config.naming.blocking_name("fetch"), "fetchBlocking");
        // Untouched sections keep their defaults.
        assert_eq!(config.naming.forget_name("fetch"), "fetchAndForget");
        assert_eq!(config.well_known.future, "com.acme.async.Promise");
        assert_eq!(config.well_known.list, "java.util.List");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = GeneratorConfig::from_toml_str("naming = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn naming_derivations() {
        let naming = Naming::default();
        let source = QualifiedName::new("pkg.sub.Type");
        assert_eq!(naming.shim_name(&source).as_str(), "pkg.sub.mutiny.Type");
        assert_eq!(
            naming.companion_name(&source).as_str(),
            "pkg.sub.mutiny.TypeImpl"
        );
        assert_eq!(naming.witness_field(1), "__typeArg_1");
    }
}
