//! Schema version registry
//!
//! Every supported revision of the metadata specification, the namespace URIs
//! each revision uses for its sub-vocabularies, and the ordering used to gate
//! elements, attributes and values.

use std::fmt;
use std::str::FromStr;

use crate::error::{DdmsError, Result};

/// A sub-vocabulary (XML namespace family) used by the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Space {
    Ddms,
    Gml,
    Ism,
    Ntk,
    Xlink,
}

impl Space {
    pub const ALL: [Space; 5] = [Space::Ddms, Space::Gml, Space::Ism, Space::Ntk, Space::Xlink];

    /// Prefix used when no configuration overrides it
    pub fn default_prefix(self) -> &'static str {
        match self {
            Space::Ddms => "ddms",
            Space::Gml => "gml",
            Space::Ism => "ism",
            Space::Ntk => "ntk",
            Space::Xlink => "xlink",
        }
    }
}

/// One dated revision of the DDMS schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaVersion {
    V2_0,
    V3_0,
    V3_1,
    V4_0_1,
    V4_1,
    V5_0,
}

const ALL_VERSIONS: [SchemaVersion; 6] = [
    SchemaVersion::V2_0,
    SchemaVersion::V3_0,
    SchemaVersion::V3_1,
    SchemaVersion::V4_0_1,
    SchemaVersion::V4_1,
    SchemaVersion::V5_0,
];

const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

impl SchemaVersion {
    /// All supported versions, oldest first
    pub fn all() -> &'static [SchemaVersion] {
        &ALL_VERSIONS
    }

    pub fn latest() -> SchemaVersion {
        SchemaVersion::V5_0
    }

    /// Resolve a version string such as `"3.1"`.
    ///
    /// `"4.0"` is accepted as an alias of `4.0.1`.
    pub fn resolve(version: &str) -> Result<SchemaVersion> {
        match version.trim() {
            "2.0" => Ok(SchemaVersion::V2_0),
            "3.0" => Ok(SchemaVersion::V3_0),
            "3.1" => Ok(SchemaVersion::V3_1),
            "4.0" | "4.0.1" => Ok(SchemaVersion::V4_0_1),
            "4.1" => Ok(SchemaVersion::V4_1),
            "5.0" => Ok(SchemaVersion::V5_0),
            other => Err(DdmsError::UnsupportedVersion(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVersion::V2_0 => "2.0",
            SchemaVersion::V3_0 => "3.0",
            SchemaVersion::V3_1 => "3.1",
            SchemaVersion::V4_0_1 => "4.0.1",
            SchemaVersion::V4_1 => "4.1",
            SchemaVersion::V5_0 => "5.0",
        }
    }

    pub fn is_at_least(self, other: SchemaVersion) -> bool {
        self >= other
    }

    pub fn is_before(self, other: SchemaVersion) -> bool {
        self < other
    }

    /// Namespace URI of a sub-vocabulary, or `None` when this version has none
    pub fn namespace(self, space: Space) -> Option<&'static str> {
        use SchemaVersion::*;
        match space {
            Space::Ddms => Some(match self {
                V2_0 => "http://metadata.dod.mil/mdr/ns/DDMS/2.0/",
                V3_0 => "http://metadata.dod.mil/mdr/ns/DDMS/3.0/",
                V3_1 => "http://metadata.dod.mil/mdr/ns/DDMS/3.1/",
                V4_0_1 | V4_1 => "urn:us:mil:ces:metadata:ddms:4",
                V5_0 => "urn:us:mil:ces:metadata:ddms:5",
            }),
            Space::Gml => Some(match self {
                V2_0 => "http://www.opengis.net/gml",
                _ => "http://www.opengis.net/gml/3.2",
            }),
            Space::Ism => Some(match self {
                V2_0 => "urn:us:gov:ic:ism:v2",
                _ => "urn:us:gov:ic:ism",
            }),
            Space::Ntk => match self {
                V2_0 | V3_0 | V3_1 => None,
                _ => Some("urn:us:gov:ic:ntk"),
            },
            Space::Xlink => Some(XLINK_NAMESPACE),
        }
    }

    /// Map a ddms namespace URI back to its version.
    ///
    /// 4.0.1 and 4.1 share a namespace; the newer version wins.
    pub fn for_namespace(uri: &str) -> Option<SchemaVersion> {
        ALL_VERSIONS
            .iter()
            .rev()
            .copied()
            .find(|version| version.namespace(Space::Ddms) == Some(uri))
    }

    /// Revision label of the security-marking vocabularies bundled for this version
    pub fn ism_revision(self) -> &'static str {
        match self {
            SchemaVersion::V2_0 => "V2",
            SchemaVersion::V3_0 | SchemaVersion::V3_1 => "V5",
            SchemaVersion::V4_0_1 | SchemaVersion::V4_1 | SchemaVersion::V5_0 => "V9",
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        SchemaVersion::latest()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = DdmsError;

    fn from_str(s: &str) -> Result<Self> {
        SchemaVersion::resolve(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_versions() {
        for version in SchemaVersion::all() {
            assert_eq!(SchemaVersion::resolve(version.as_str()).unwrap(), *version);
        }
        assert_eq!(SchemaVersion::resolve("4.0").unwrap(), SchemaVersion::V4_0_1);
    }

    #[test]
    fn test_resolve_unknown_version() {
        match SchemaVersion::resolve("1.4") {
            Err(DdmsError::UnsupportedVersion(version)) => assert_eq!(version, "1.4"),
            other => panic!("Expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_ordering() {
        assert!(SchemaVersion::V3_1.is_at_least(SchemaVersion::V3_0));
        assert!(SchemaVersion::V3_1.is_at_least(SchemaVersion::V3_1));
        assert!(SchemaVersion::V2_0.is_before(SchemaVersion::V3_0));
        assert!(!SchemaVersion::V5_0.is_before(SchemaVersion::V4_1));

        let mut sorted = SchemaVersion::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, SchemaVersion::all());
    }

    #[test]
    fn test_shared_namespace_resolves_to_newest() {
        let uri = SchemaVersion::V4_0_1.namespace(Space::Ddms).unwrap();
        assert_eq!(SchemaVersion::for_namespace(uri), Some(SchemaVersion::V4_1));
        assert_eq!(
            SchemaVersion::for_namespace("http://metadata.dod.mil/mdr/ns/DDMS/2.0/"),
            Some(SchemaVersion::V2_0)
        );
        assert_eq!(SchemaVersion::for_namespace("urn:unknown"), None);
    }

    #[test]
    fn test_ntk_absent_before_4() {
        assert!(SchemaVersion::V3_1.namespace(Space::Ntk).is_none());
        assert!(SchemaVersion::V4_0_1.namespace(Space::Ntk).is_some());
    }
}
