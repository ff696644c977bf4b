mod common;

use ddms_records::{Component, RecordContext, Resource, SchemaVersion};
use rayon::prelude::*;

use common::minimal_resource;

#[test]
fn test_records_of_different_versions_build_concurrently() {
    let base = RecordContext::for_version(SchemaVersion::latest());
    let expected: Vec<(SchemaVersion, String)> = SchemaVersion::all()
        .iter()
        .map(|version| {
            let xml = minimal_resource(&base.with_version(*version)).to_xml().unwrap();
            (*version, xml)
        })
        .collect();

    let jobs: Vec<SchemaVersion> = SchemaVersion::all()
        .iter()
        .copied()
        .cycle()
        .take(SchemaVersion::all().len() * 16)
        .collect();

    let built: Vec<(SchemaVersion, String)> = jobs
        .par_iter()
        .map(|version| {
            let ctx = base.with_version(*version);
            let resource = minimal_resource(&ctx);
            let reparsed = Resource::from_xml(&resource.to_xml().unwrap(), &ctx).unwrap();
            assert_eq!(reparsed.version(), *version);
            (*version, reparsed.to_xml().unwrap())
        })
        .collect();

    for (version, xml) in built {
        let (_, want) = expected.iter().find(|(v, _)| *v == version).unwrap();
        assert_eq!(&xml, want, "DDMS {} differed under concurrency", version);
    }
}

#[test]
fn test_shared_store_loads_each_vocabulary_once() {
    let base = RecordContext::for_version(SchemaVersion::V5_0);

    (0..64).into_par_iter().for_each(|i| {
        let version = SchemaVersion::all()[i % SchemaVersion::all().len()];
        minimal_resource(&base.with_version(version));
    });

    // Three bundled revisions, two vocabularies consulted per revision
    assert_eq!(base.vocabulary().cached_entries(), 6);
}
