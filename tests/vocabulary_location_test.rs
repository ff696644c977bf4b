mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use ddms_records::config::VocabularyConfig;
use ddms_records::vocabulary::{CLASSIFICATION, DISSEMINATION, OWNER_PRODUCER, SCI_CONTROLS};
use ddms_records::{RecordContext, SchemaVersion, Security, SecurityAttributes, VocabularyStore};
use tempfile::TempDir;

use common::write_vocabulary;

fn restricted_vocabularies() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_vocabulary(dir.path(), CLASSIFICATION, &["U", "S"]);
    write_vocabulary(dir.path(), OWNER_PRODUCER, &["USA"]);
    write_vocabulary(dir.path(), SCI_CONTROLS, &["SI"]);
    write_vocabulary(dir.path(), DISSEMINATION, &["FOUO"]);
    dir
}

fn store_for(version: SchemaVersion, dir: &TempDir) -> VocabularyStore {
    let locations = BTreeMap::from([(
        VocabularyConfig::location_key(version),
        dir.path().display().to_string(),
    )]);
    VocabularyStore::new(locations, 16)
}

#[test]
fn test_configured_location_replaces_bundled_vocabulary() {
    let dir = restricted_vocabularies();
    let ctx = RecordContext::new(SchemaVersion::V5_0, Arc::new(store_for(SchemaVersion::V5_0, &dir)));

    assert!(Security::new(&SecurityAttributes::marking("S", &["USA"]), &ctx).is_ok());

    let err = Security::new(&SecurityAttributes::marking("C", &["USA"]), &ctx).unwrap_err();
    let message = err.message().unwrap();
    assert_eq!(message.locator(), "/ddms:security");
    assert!(message.text().contains("C is not a valid enumeration token"));

    assert!(Security::new(&SecurityAttributes::marking("U", &["GBR"]), &ctx).is_err());
}

#[test]
fn test_unconfigured_version_uses_bundled_vocabulary() {
    let dir = restricted_vocabularies();
    let ctx = RecordContext::new(SchemaVersion::V5_0, Arc::new(store_for(SchemaVersion::V5_0, &dir)));

    let older = ctx.with_version(SchemaVersion::V4_1);
    assert!(Security::new(&SecurityAttributes::marking("C", &["GBR"]), &older).is_ok());
}

#[test]
fn test_bulk_load_skips_broken_vocabularies() {
    let dir = restricted_vocabularies();
    std::fs::remove_file(dir.path().join(format!("{}.xml", SCI_CONTROLS))).unwrap();
    std::fs::write(
        dir.path().join(format!("{}.xml", DISSEMINATION)),
        "<CVE><Enumeration>",
    )
    .unwrap();

    let store = store_for(SchemaVersion::V3_1, &dir);
    let report = store.load_all(SchemaVersion::V3_1);

    assert_eq!(report.location, dir.path().display().to_string());
    assert_eq!(report.loaded, vec![CLASSIFICATION.to_string(), OWNER_PRODUCER.to_string()]);
    let skipped: Vec<&str> = report.skipped.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(skipped, vec![SCI_CONTROLS, DISSEMINATION]);

    // The failure comes back when the vocabulary is actually needed
    let ctx = RecordContext::new(SchemaVersion::V3_1, Arc::new(store));
    let marking = SecurityAttributes::marking("U", &["USA"]).with_sci_controls(&["SI"]);
    let err = Security::new(&marking, &ctx).unwrap_err();
    assert!(err.to_string().contains("No controlled vocabulary could be found"));
}

#[test]
fn test_loaded_vocabularies_are_cached() {
    let dir = restricted_vocabularies();
    let store = store_for(SchemaVersion::V5_0, &dir);

    assert!(!store.is_cached(SchemaVersion::V5_0, CLASSIFICATION));
    assert!(store.contains(SchemaVersion::V5_0, CLASSIFICATION, "U").unwrap());
    assert!(store.is_cached(SchemaVersion::V5_0, CLASSIFICATION));

    // Cached entries survive the file going away
    std::fs::remove_file(dir.path().join(format!("{}.xml", CLASSIFICATION))).unwrap();
    assert!(store.contains(SchemaVersion::V5_0, CLASSIFICATION, "S").unwrap());
}
