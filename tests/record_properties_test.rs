mod common;

use ddms_records::builder::Builder;
use ddms_records::catalog::geospatial::BoundingGeometry;
use ddms_records::catalog::producer::Person;
use ddms_records::catalog::summary::{Dates, Identifier};
use ddms_records::leaf::{PROCESSING_INFO, TextComponent};
use ddms_records::{
    Component, MessageKind, RecordContext, Resource, ResourceBuilder, SchemaVersion, Security,
    SecurityAttributes, TopLevel,
};

use common::{header, marking, minimal_components, minimal_resource};

#[test]
fn test_round_trip_in_every_version() {
    for version in SchemaVersion::all() {
        let ctx = RecordContext::for_version(*version);
        let resource = minimal_resource(&ctx);
        let xml = resource.to_xml().unwrap();

        let reparsed = Resource::from_xml(&xml, &ctx).unwrap();
        assert_eq!(reparsed, resource, "round trip failed for DDMS {}", version);
        assert_eq!(reparsed.to_xml().unwrap(), xml);
    }
}

#[test]
fn test_round_trip_keeps_whitespace_in_values() {
    let ctx = RecordContext::for_version(SchemaVersion::V5_0);
    let mut parts = minimal_components(&ctx);
    parts[0] = Identifier::new("URI", "line1\nline2\ttab", &ctx).unwrap().into();
    parts[1] = TextComponent::title("a\r\nb", &marking(), &ctx).unwrap().into();
    let resource = Resource::new(&parts, Some(&header()), &marking(), &ctx).unwrap();

    let xml = resource.to_xml().unwrap();
    assert!(xml.contains("line1&#10;line2&#9;tab"));

    let reparsed = Resource::from_xml(&xml, &ctx).unwrap();
    assert_eq!(reparsed, resource);
    assert_eq!(reparsed.to_xml().unwrap(), xml);
}

#[test]
fn test_revalidation_is_idempotent() {
    let ctx = RecordContext::for_version(SchemaVersion::V5_0);
    let mut parts = minimal_components(&ctx);
    parts.push(Dates::new(&[], &ctx).unwrap().into());
    let resource = Resource::new(&parts, Some(&header()), &marking(), &ctx).unwrap();

    assert_eq!(resource.warnings().len(), 1);
    let warning = &resource.warnings()[0];
    assert_eq!(warning.kind(), MessageKind::Warning);
    assert_eq!(warning.locator(), "/ddms:resource/ddms:dates");

    let revalidated = resource.revalidate(&ctx).unwrap();
    assert_eq!(revalidated, resource);
    assert_eq!(revalidated.warnings(), resource.warnings());
}

#[test]
fn test_element_names_follow_version() {
    let old = minimal_resource(&RecordContext::for_version(SchemaVersion::V3_1))
        .to_xml()
        .unwrap();
    assert!(old.starts_with("<ddms:Resource"));
    assert!(old.contains("<ddms:Person>"));
    assert!(old.contains("<ddms:Subject>"));

    let new = minimal_resource(&RecordContext::for_version(SchemaVersion::V5_0))
        .to_xml()
        .unwrap();
    assert!(new.starts_with("<ddms:resource"));
    assert!(new.contains("<ddms:person>"));
    assert!(!new.contains("<ddms:Subject>"));
}

#[test]
fn test_record_is_rejected_under_another_version() {
    let xml = minimal_resource(&RecordContext::for_version(SchemaVersion::V5_0))
        .to_xml()
        .unwrap();
    let err = Resource::from_xml(&xml, &RecordContext::for_version(SchemaVersion::V3_0)).unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("Unexpected namespace URI and local name"));
}

#[test]
fn test_processing_info_gated_at_4_1() {
    let info = |ctx: &RecordContext| {
        TextComponent::new(
            &PROCESSING_INFO,
            "Converted",
            &marking(),
            &[("dateProcessed", "2011-08-31")],
            ctx,
        )
    };
    assert!(info(&RecordContext::for_version(SchemaVersion::V4_0_1)).is_err());

    let ctx = RecordContext::for_version(SchemaVersion::V4_1);
    let mut parts = minimal_components(&ctx);
    parts.push(info(&ctx).unwrap().into());
    let resource = Resource::new(&parts, Some(&header()), &marking(), &ctx).unwrap();
    assert_eq!(
        resource
            .components()
            .iter()
            .filter(|part| matches!(part, TopLevel::Text(_)))
            .count(),
        2
    );
}

#[test]
fn test_vocabulary_membership_depends_on_version() {
    let marking = SecurityAttributes::marking("U", &["JPN"]);

    let err = Security::new(&marking, &RecordContext::for_version(SchemaVersion::V2_0)).unwrap_err();
    assert!(err.to_string().contains("CVEnumISMOwnerProducer"));
    assert!(Security::new(&marking, &RecordContext::for_version(SchemaVersion::V3_0)).is_ok());
}

#[test]
fn test_empty_builder_commits_to_nothing() {
    let ctx = RecordContext::for_version(SchemaVersion::V5_0);
    let mut builder = ResourceBuilder::default();
    assert!(builder.is_empty());
    assert!(builder.commit(&ctx).unwrap().is_none());

    builder.identifiers.ensure_len(3);
    builder.subject_coverages.get_or_default(1);
    assert_eq!(builder.identifiers.len(), 3);
    assert!(builder.is_empty());
    assert!(builder.commit(&ctx).unwrap().is_none());

    builder.identifiers.get_or_default(2).value = "urn:example".to_string();
    assert!(!builder.is_empty());
    let err = builder.commit(&ctx).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn test_builder_round_trip_through_xml() {
    let ctx = RecordContext::for_version(SchemaVersion::V3_1);
    let resource = minimal_resource(&ctx);
    let parsed = Resource::from_xml(&resource.to_xml().unwrap(), &ctx).unwrap();

    let committed = ResourceBuilder::from(&parsed).commit(&ctx).unwrap().unwrap();
    assert_eq!(committed, resource);
}

#[test]
fn test_scenario_full_date_required() {
    let ctx = RecordContext::for_version(SchemaVersion::V5_0);
    let mut builder = ResourceBuilder::from(&minimal_resource(&ctx));
    builder.create_date = "2001".to_string();

    let err = builder.commit(&ctx).unwrap_err();
    let message = err.message().unwrap();
    assert_eq!(message.kind(), MessageKind::Error);
    assert!(message.text().contains("date format"));
    assert_eq!(message.locator(), "/ddms:resource");
}

#[test]
fn test_scenario_missing_repeating_child() {
    let ctx = RecordContext::for_version(SchemaVersion::V5_0);

    let err = Person::new(&[], "Uri", None, &[], &[], &[], &ctx).unwrap_err();
    let message = err.message().unwrap();
    assert_eq!(message.text(), "At least one name must exist.");
    assert_eq!(message.locator(), "/ddms:person");

    let err = BoundingGeometry::new(&[], &ctx).unwrap_err();
    assert_eq!(err.message().unwrap().text(), "At least one gml:Point must exist.");
}

#[test]
fn test_scenario_completely_empty_element() {
    let ctx = RecordContext::for_version(SchemaVersion::V4_1);
    let dates = Dates::new(&[], &ctx).unwrap();

    assert_eq!(dates.warnings().len(), 1);
    let warning = &dates.warnings()[0];
    assert_eq!(warning.kind(), MessageKind::Warning);
    assert_eq!(warning.text(), "A completely empty element was found.");
}

#[test]
fn test_scenario_same_values_same_component() {
    let ctx = RecordContext::for_version(SchemaVersion::V4_0_1);
    let build = || {
        Person::new(
            &["Brian", "B"],
            "Uri",
            Some("123"),
            &["DISA"],
            &["703-882-1000"],
            &["ddms@fgm.com"],
            &ctx,
        )
        .unwrap()
    };

    let first = build();
    let second = build();
    assert_eq!(first, second);
    assert_eq!(first.to_xml().unwrap(), second.to_xml().unwrap());
}
