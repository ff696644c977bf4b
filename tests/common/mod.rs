#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ddms_records::catalog::producer::{Person, ProducerKind, ProducerRole};
use ddms_records::catalog::subject::{Keyword, SubjectCoverage};
use ddms_records::catalog::summary::Identifier;
use ddms_records::{
    Component, RecordContext, Resource, ResourceHeader, SchemaVersion, Security,
    SecurityAttributes, TextComponent, TopLevel,
};

pub fn marking() -> SecurityAttributes {
    SecurityAttributes::marking("U", &["USA"])
}

pub fn header() -> ResourceHeader {
    ResourceHeader {
        resource_element: true,
        create_date: "2010-01-21".to_string(),
        des_version: 9,
    }
}

/// The required children of a resource, valid in every version
pub fn minimal_components(ctx: &RecordContext) -> Vec<TopLevel> {
    let person = Person::new(&["Brian"], "Uri", None, &[], &[], &[], ctx).unwrap();
    let keyword = Keyword::new("DDMSence", ctx).unwrap();
    vec![
        Identifier::new("URI", "urn:buri:ddmsence:testing", ctx)
            .unwrap()
            .into(),
        TextComponent::title("DDMSence", &marking(), ctx)
            .unwrap()
            .into(),
        ProducerRole::new(
            ProducerKind::Creator,
            person,
            &SecurityAttributes::default(),
            ctx,
        )
        .unwrap()
        .into(),
        SubjectCoverage::new(&[keyword], &[], &SecurityAttributes::default(), ctx)
            .unwrap()
            .into(),
        Security::new(&marking(), ctx).unwrap().into(),
    ]
}

/// A minimal valid resource for the context's version
pub fn minimal_resource(ctx: &RecordContext) -> Resource {
    if ctx.version().is_at_least(SchemaVersion::V3_0) {
        Resource::new(&minimal_components(ctx), Some(&header()), &marking(), ctx).unwrap()
    } else {
        Resource::new(
            &minimal_components(ctx),
            None,
            &SecurityAttributes::default(),
            ctx,
        )
        .unwrap()
    }
}

/// Write a minimal record for `version` into `dir`
pub fn write_record(dir: &Path, name: &str, version: SchemaVersion) -> PathBuf {
    let ctx = RecordContext::for_version(version);
    let path = dir.join(name);
    std::fs::write(&path, minimal_resource(&ctx).to_xml().unwrap()).unwrap();
    path
}

/// Write a vocabulary document holding literal tokens
pub fn write_vocabulary(dir: &Path, key: &str, tokens: &[&str]) {
    let terms: String = tokens
        .iter()
        .map(|token| format!("<Term><Value>{}</Value></Term>", token))
        .collect();
    std::fs::write(
        dir.join(format!("{}.xml", key)),
        format!(
            r#"<CVE xmlns="urn:us:gov:ic:cve"><Enumeration name="{}">{}</Enumeration></CVE>"#,
            key, terms
        ),
    )
    .unwrap();
}
