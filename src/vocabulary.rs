//! Controlled vocabulary store
//!
//! Vocabularies are small CVE documents, one per key, holding literal tokens
//! and regular-expression patterns. Each schema version resolves to a
//! location (a bundled `builtin:` set or an operator-provided directory) and
//! parsed vocabularies are cached on (location, key). Versions that resolve to
//! the same location share cache entries, so switching between them never
//! re-parses anything.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use moka::sync::Cache;
use regex::Regex;

use crate::config::VocabularyConfig;
use crate::error::{Result, VocabularyError};
use crate::version::SchemaVersion;

pub const CLASSIFICATION: &str = "CVEnumISMClassificationAll";
pub const OWNER_PRODUCER: &str = "CVEnumISMOwnerProducer";
pub const SCI_CONTROLS: &str = "CVEnumISMSCIcontrols";
pub const DISSEMINATION: &str = "CVEnumISMDissem";

/// Every vocabulary key loaded in bulk
pub const VOCABULARY_KEYS: [&str; 4] = [CLASSIFICATION, OWNER_PRODUCER, SCI_CONTROLS, DISSEMINATION];

const BUILTIN_SCHEME: &str = "builtin:";
const DEFAULT_MAX_ENTRIES: u64 = 64;

/// Bundled vocabularies, keyed by (revision directory, vocabulary key)
static BUILTIN: &[(&str, &str, &str)] = &[
    ("ism/V2", CLASSIFICATION, include_str!("../resources/vocabulary/V2/CVEnumISMClassificationAll.xml")),
    ("ism/V2", OWNER_PRODUCER, include_str!("../resources/vocabulary/V2/CVEnumISMOwnerProducer.xml")),
    ("ism/V2", SCI_CONTROLS, include_str!("../resources/vocabulary/V2/CVEnumISMSCIcontrols.xml")),
    ("ism/V2", DISSEMINATION, include_str!("../resources/vocabulary/V2/CVEnumISMDissem.xml")),
    ("ism/V5", CLASSIFICATION, include_str!("../resources/vocabulary/V5/CVEnumISMClassificationAll.xml")),
    ("ism/V5", OWNER_PRODUCER, include_str!("../resources/vocabulary/V5/CVEnumISMOwnerProducer.xml")),
    ("ism/V5", SCI_CONTROLS, include_str!("../resources/vocabulary/V5/CVEnumISMSCIcontrols.xml")),
    ("ism/V5", DISSEMINATION, include_str!("../resources/vocabulary/V5/CVEnumISMDissem.xml")),
    ("ism/V9", CLASSIFICATION, include_str!("../resources/vocabulary/V9/CVEnumISMClassificationAll.xml")),
    ("ism/V9", OWNER_PRODUCER, include_str!("../resources/vocabulary/V9/CVEnumISMOwnerProducer.xml")),
    ("ism/V9", SCI_CONTROLS, include_str!("../resources/vocabulary/V9/CVEnumISMSCIcontrols.xml")),
    ("ism/V9", DISSEMINATION, include_str!("../resources/vocabulary/V9/CVEnumISMDissem.xml")),
];

/// One parsed vocabulary
#[derive(Debug)]
pub struct Vocabulary {
    key: String,
    tokens: Vec<String>,
    token_set: HashSet<String>,
    patterns: Vec<Regex>,
}

impl Vocabulary {
    /// Parse a CVE document: `Term` elements with a `Value`, optionally
    /// flagged `isPattern="true"`.
    pub fn parse(
        key: &str,
        location: &str,
        text: &str,
    ) -> std::result::Result<Self, VocabularyError> {
        let malformed = |details: String| VocabularyError::Malformed {
            key: key.to_string(),
            location: location.to_string(),
            details,
        };

        let document = roxmltree::Document::parse(text).map_err(|e| malformed(e.to_string()))?;

        let mut tokens = Vec::new();
        let mut patterns = Vec::new();
        for term in document
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == "Term")
        {
            let value = term
                .children()
                .find(|child| child.is_element() && child.tag_name().name() == "Value")
                .and_then(|value| value.text())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| malformed("Term without a Value".to_string()))?;

            if term.attribute("isPattern") == Some("true") {
                let regex = Regex::new(&format!("^(?:{})$", value)).map_err(|e| {
                    VocabularyError::Pattern {
                        key: key.to_string(),
                        location: location.to_string(),
                        pattern: value.to_string(),
                        details: e.to_string(),
                    }
                })?;
                patterns.push(regex);
            } else {
                tokens.push(value.to_string());
            }
        }

        if tokens.is_empty() && patterns.is_empty() {
            return Err(malformed("no Term entries found".to_string()));
        }

        let token_set = tokens.iter().cloned().collect();
        Ok(Self {
            key: key.to_string(),
            tokens,
            token_set,
            patterns,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Literal tokens in document order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Exact token match first, then a full match against any pattern
    pub fn contains(&self, value: &str) -> bool {
        self.token_set.contains(value) || self.patterns.iter().any(|pattern| pattern.is_match(value))
    }
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub location: String,
    pub loaded: Vec<String>,
    pub skipped: Vec<(String, String)>,
}

/// Per-(location, key) cache of parsed vocabularies.
///
/// Population goes through `moka`'s `try_get_with`, so concurrent callers
/// asking for the same entry wait on a single loader.
pub struct VocabularyStore {
    locations: BTreeMap<String, String>,
    cache: Cache<(String, String), Arc<Vocabulary>>,
}

impl fmt::Debug for VocabularyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocabularyStore")
            .field("locations", &self.locations)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl VocabularyStore {
    /// Keys written with a version alias (`"4.0.vocab.location"`) are stored
    /// under the canonical property name of the version they resolve to
    pub fn new(locations: BTreeMap<String, String>, max_entries: u64) -> Self {
        let locations = locations
            .into_iter()
            .map(|(key, location)| {
                let key = VocabularyConfig::canonical_key(&key).unwrap_or(key);
                (key, location)
            })
            .collect();
        let cache = Cache::builder().max_capacity(max_entries).build();
        Self { locations, cache }
    }

    /// Store using only the bundled vocabularies
    pub fn builtin() -> Self {
        Self::new(BTreeMap::new(), DEFAULT_MAX_ENTRIES)
    }

    pub fn from_config(config: &VocabularyConfig) -> Self {
        Self::new(config.locations.clone(), config.max_entries)
    }

    /// Resolved location for a version: the configured
    /// `"<version>.vocab.location"` property, else the bundled revision.
    pub fn location_for(&self, version: SchemaVersion) -> String {
        self.locations
            .get(&VocabularyConfig::location_key(version))
            .cloned()
            .unwrap_or_else(|| format!("{}ism/{}", BUILTIN_SCHEME, version.ism_revision()))
    }

    /// Load (or fetch from cache) one vocabulary for a version
    pub fn load(&self, version: SchemaVersion, key: &str) -> Result<Arc<Vocabulary>> {
        let location = self.location_for(version);
        self.cache
            .try_get_with((location.clone(), key.to_string()), || {
                read_vocabulary(&location, key)
            })
            .map_err(|e| (*e).clone().into())
    }

    /// Load every known vocabulary for a version.
    ///
    /// A vocabulary that fails to load is logged and skipped; the failure
    /// surfaces again the first time that vocabulary is queried.
    pub fn load_all(&self, version: SchemaVersion) -> LoadReport {
        let mut report = LoadReport {
            location: self.location_for(version),
            ..LoadReport::default()
        };

        for key in VOCABULARY_KEYS {
            match self.load(version, key) {
                Ok(_) => report.loaded.push(key.to_string()),
                Err(e) => {
                    tracing::warn!(
                        key,
                        location = %report.location,
                        error = %e,
                        "Skipping controlled vocabulary that failed to load"
                    );
                    report.skipped.push((key.to_string(), e.to_string()));
                }
            }
        }

        report
    }

    /// Whether `value` is legal for `key` under `version`
    pub fn contains(&self, version: SchemaVersion, key: &str, value: &str) -> Result<bool> {
        Ok(self.load(version, key)?.contains(value))
    }

    /// Literal tokens of a vocabulary under `version`
    pub fn tokens(&self, version: SchemaVersion, key: &str) -> Result<Vec<String>> {
        Ok(self.load(version, key)?.tokens().to_vec())
    }

    /// Whether a vocabulary is already parsed for the version's location
    pub fn is_cached(&self, version: SchemaVersion, key: &str) -> bool {
        self.cache
            .contains_key(&(self.location_for(version), key.to_string()))
    }

    pub fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

fn read_vocabulary(
    location: &str,
    key: &str,
) -> std::result::Result<Arc<Vocabulary>, VocabularyError> {
    tracing::debug!(key, location, "Loading controlled vocabulary");

    let text = match location.strip_prefix(BUILTIN_SCHEME) {
        Some(directory) => BUILTIN
            .iter()
            .find(|(dir, name, _)| *dir == directory && *name == key)
            .map(|(_, _, text)| text.to_string())
            .ok_or_else(|| VocabularyError::NotFound {
                key: key.to_string(),
                location: location.to_string(),
            })?,
        None => {
            let path = Path::new(location).join(format!("{}.xml", key));
            std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => VocabularyError::NotFound {
                    key: key.to_string(),
                    location: location.to_string(),
                },
                _ => VocabularyError::Unreadable {
                    key: key.to_string(),
                    location: location.to_string(),
                    details: e.to_string(),
                },
            })?
        }
    };

    Vocabulary::parse(key, location, &text).map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DdmsError;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<CVE xmlns="urn:us:gov:ic:cve"><Enumeration>
        <Term><Value>ALPHA</Value></Term>
        <Term><Value> BRAVO </Value></Term>
        <Term isPattern="true"><Value>X-[0-9]{2}</Value></Term>
    </Enumeration></CVE>"#;

    #[test]
    fn test_parse_tokens_and_patterns() {
        let vocabulary = Vocabulary::parse("Sample", "memory", SAMPLE).unwrap();
        assert_eq!(vocabulary.tokens(), ["ALPHA", "BRAVO"]);
        assert_eq!(vocabulary.pattern_count(), 1);
        assert!(vocabulary.contains("ALPHA"));
        assert!(vocabulary.contains("BRAVO"));
        assert!(vocabulary.contains("X-42"));
        assert!(!vocabulary.contains("X-421"));
        assert!(!vocabulary.contains("alpha"));
    }

    #[test]
    fn test_parse_rejects_bad_documents() {
        assert!(matches!(
            Vocabulary::parse("Sample", "memory", "<CVE><Enumeration/></CVE>"),
            Err(VocabularyError::Malformed { .. })
        ));
        assert!(matches!(
            Vocabulary::parse("Sample", "memory", "<CVE><Term>"),
            Err(VocabularyError::Malformed { .. })
        ));
        assert!(matches!(
            Vocabulary::parse(
                "Sample",
                "memory",
                r#"<CVE><Term isPattern="true"><Value>([</Value></Term></CVE>"#
            ),
            Err(VocabularyError::Pattern { .. })
        ));
    }

    #[test]
    fn test_builtin_membership_changes_with_version() {
        let store = VocabularyStore::builtin();
        assert!(!store.contains(SchemaVersion::V2_0, DISSEMINATION, "RELIDO").unwrap());
        assert!(store.contains(SchemaVersion::V3_0, DISSEMINATION, "RELIDO").unwrap());
        assert!(!store.contains(SchemaVersion::V2_0, SCI_CONTROLS, "SI-G-ABCD").unwrap());
        assert!(store.contains(SchemaVersion::V3_1, SCI_CONTROLS, "SI-G-ABCD").unwrap());
    }

    #[test]
    fn test_versions_sharing_a_location_share_entries() {
        let store = VocabularyStore::builtin();
        assert_eq!(
            store.location_for(SchemaVersion::V3_0),
            store.location_for(SchemaVersion::V3_1)
        );

        store.load(SchemaVersion::V3_0, CLASSIFICATION).unwrap();
        assert!(store.is_cached(SchemaVersion::V3_1, CLASSIFICATION));
        assert!(!store.is_cached(SchemaVersion::V2_0, CLASSIFICATION));

        store.load(SchemaVersion::V3_1, CLASSIFICATION).unwrap();
        assert_eq!(store.cached_entries(), 1);
    }

    #[test]
    fn test_directory_location_and_soft_bulk_failure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(format!("{}.xml", CLASSIFICATION)), SAMPLE).unwrap();
        std::fs::write(
            temp_dir.path().join(format!("{}.xml", DISSEMINATION)),
            "<CVE><broken>",
        )
        .unwrap();

        let mut locations = BTreeMap::new();
        locations.insert(
            VocabularyConfig::location_key(SchemaVersion::V4_1),
            temp_dir.path().display().to_string(),
        );
        let store = VocabularyStore::new(locations, 16);

        let report = store.load_all(SchemaVersion::V4_1);
        assert_eq!(report.loaded, vec![CLASSIFICATION.to_string()]);
        assert_eq!(report.skipped.len(), 3);

        assert!(store.contains(SchemaVersion::V4_1, CLASSIFICATION, "X-07").unwrap());
        assert!(matches!(
            store.contains(SchemaVersion::V4_1, DISSEMINATION, "FOUO"),
            Err(DdmsError::VocabularyLoad { .. })
        ));

        // Other versions still use the bundled vocabularies
        assert!(store.contains(SchemaVersion::V4_0_1, DISSEMINATION, "FOUO").unwrap());
    }

    #[test]
    fn test_version_alias_key_is_honored() {
        let locations = BTreeMap::from([("4.0.vocab.location".to_string(), "/opt/cve".to_string())]);
        let store = VocabularyStore::new(locations, 16);

        assert_eq!(store.location_for(SchemaVersion::V4_0_1), "/opt/cve");
        assert_ne!(store.location_for(SchemaVersion::V4_1), "/opt/cve");
    }
}
