//! Explicit record context
//!
//! The active schema version travels on a [`RecordContext`] together with
//! the vocabulary store and namespace prefixes, and is passed to every parse,
//! construct and validate call. Contexts clone by `Arc` and are `Send + Sync`,
//! so records of different versions can be built side by side.

use std::sync::Arc;

use crate::config::{Config, PrefixConfig};
use crate::error::{DdmsError, Result};
use crate::node::QName;
use crate::validation::ValidationMessage;
use crate::version::{SchemaVersion, Space};
use crate::vocabulary::VocabularyStore;

#[derive(Debug, Clone)]
pub struct RecordContext {
    version: SchemaVersion,
    vocabulary: Arc<VocabularyStore>,
    prefixes: Arc<PrefixConfig>,
}

impl RecordContext {
    pub fn new(version: SchemaVersion, vocabulary: Arc<VocabularyStore>) -> Self {
        Self {
            version,
            vocabulary,
            prefixes: Arc::new(PrefixConfig::default()),
        }
    }

    /// Context backed by the bundled vocabularies and default prefixes
    pub fn for_version(version: SchemaVersion) -> Self {
        Self::new(version, Arc::new(VocabularyStore::builtin()))
    }

    /// Context built from loaded configuration, at its default version
    pub fn from_config(config: &Config) -> Result<Self> {
        let version = SchemaVersion::resolve(&config.schema.default_version)?;
        let vocabulary = Arc::new(VocabularyStore::from_config(&config.vocabulary));
        Ok(Self::new(version, vocabulary).with_prefixes(config.prefixes.clone()))
    }

    pub fn with_prefixes(mut self, prefixes: PrefixConfig) -> Self {
        self.prefixes = Arc::new(prefixes);
        self
    }

    /// Same vocabulary store and prefixes, different version
    pub fn with_version(&self, version: SchemaVersion) -> Self {
        Self {
            version,
            vocabulary: Arc::clone(&self.vocabulary),
            prefixes: Arc::clone(&self.prefixes),
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn vocabulary(&self) -> &VocabularyStore {
        &self.vocabulary
    }

    pub fn prefix(&self, space: Space) -> &str {
        self.prefixes.prefix(space)
    }

    /// Namespace URI of a sub-vocabulary under the active version
    pub fn namespace(&self, space: Space) -> Result<&'static str> {
        self.version.namespace(space).ok_or_else(|| {
            DdmsError::Invalid(ValidationMessage::error(
                format!(
                    "The {} namespace cannot be used in DDMS {}.",
                    space.default_prefix(),
                    self.version
                ),
                "/",
            ))
        })
    }

    /// Qualified name in a sub-vocabulary under the active version
    pub fn qname(&self, space: Space, local: &str) -> Result<QName> {
        Ok(QName::new(self.prefix(space), local, self.namespace(space)?))
    }

    /// Namespace URI of a sub-vocabulary, or the empty string when it does not exist
    pub fn namespace_or_empty(&self, space: Space) -> &'static str {
        self.version.namespace(space).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_version_shares_vocabulary() {
        let ctx = RecordContext::for_version(SchemaVersion::V3_0);
        let other = ctx.with_version(SchemaVersion::V5_0);

        assert_eq!(ctx.version(), SchemaVersion::V3_0);
        assert_eq!(other.version(), SchemaVersion::V5_0);
        assert!(std::ptr::eq(ctx.vocabulary(), other.vocabulary()));
    }

    #[test]
    fn test_qname_uses_configured_prefix() {
        let prefixes = PrefixConfig {
            ddms: "d".to_string(),
            ..PrefixConfig::default()
        };
        let ctx = RecordContext::for_version(SchemaVersion::V4_1).with_prefixes(prefixes);

        let name = ctx.qname(Space::Ddms, "title").unwrap();
        assert_eq!(name.qualified(), "d:title");
        assert_eq!(name.namespace(), "urn:us:mil:ces:metadata:ddms:4");
    }

    #[test]
    fn test_missing_namespace_is_an_error() {
        let ctx = RecordContext::for_version(SchemaVersion::V3_1);
        assert!(ctx.namespace(Space::Ntk).is_err());
        assert_eq!(ctx.namespace_or_empty(Space::Ntk), "");
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecordContext>();
    }
}
