//! Identifier, language and dates
use crate::builder::{self, Builder};
use crate::component::{Component, ElementDef, check_attribute_since};
use crate::context::RecordContext;
use crate::error::Result;
use crate::node::ComponentNode;
use crate::validation::{self, DateRule, ValidationMessage};
use crate::version::{SchemaVersion, Space};

const IDENTIFIER: ElementDef = ElementDef::new(Space::Ddms, "identifier");
const LANGUAGE: ElementDef = ElementDef::new(Space::Ddms, "language");
const DATES: ElementDef = ElementDef::new(Space::Ddms, "dates");

const QUALIFIER: &str = "qualifier";
const VALUE: &str = "value";

/// A `ddms:identifier` with a URI qualifier and a value
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    node: ComponentNode,
    version: SchemaVersion,
}

impl Identifier {
    pub fn new(qualifier: &str, value: &str, ctx: &RecordContext) -> Result<Self> {
        let node = IDENTIFIER
            .new_node(ctx)?
            .with_optional_attribute(ctx.qname(Space::Ddms, QUALIFIER)?, Some(qualifier))
            .with_optional_attribute(ctx.qname(Space::Ddms, VALUE)?, Some(value));
        Self::from_node(&node, ctx)
    }

    pub fn qualifier(&self) -> &str {
        self.attr(QUALIFIER)
    }

    pub fn value(&self) -> &str {
        self.attr(VALUE)
    }

    fn attr(&self, local: &str) -> &str {
        let ddms = self.version.namespace(Space::Ddms).unwrap_or("");
        self.node.attribute(ddms, local).unwrap_or_default()
    }
}

impl Component for Identifier {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = IDENTIFIER.open(node, ctx)?;
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        let qualifier = checks.required_attribute(ddms, QUALIFIER)?;
        checks.required_attribute(ddms, VALUE)?;
        validation::check_uri(qualifier, QUALIFIER, checks.locator())?;

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierBuilder {
    pub qualifier: String,
    pub value: String,
}

impl From<&Identifier> for IdentifierBuilder {
    fn from(identifier: &Identifier) -> Self {
        Self {
            qualifier: identifier.qualifier().to_string(),
            value: identifier.value().to_string(),
        }
    }
}

impl Builder for IdentifierBuilder {
    type Target = Identifier;

    fn is_empty(&self) -> bool {
        builder::is_blank(&self.qualifier) && builder::is_blank(&self.value)
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Identifier>> {
        if self.is_empty() {
            return Ok(None);
        }
        Identifier::new(&self.qualifier, &self.value, ctx).map(Some)
    }
}

/// A `ddms:language`; both attributes are optional but expected together
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    node: ComponentNode,
    version: SchemaVersion,
    warnings: Vec<ValidationMessage>,
}

impl Language {
    pub fn new(qualifier: &str, value: &str, ctx: &RecordContext) -> Result<Self> {
        let node = LANGUAGE
            .new_node(ctx)?
            .with_optional_attribute(ctx.qname(Space::Ddms, QUALIFIER)?, Some(qualifier))
            .with_optional_attribute(ctx.qname(Space::Ddms, VALUE)?, Some(value));
        Self::from_node(&node, ctx)
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.attr(QUALIFIER)
    }

    pub fn value(&self) -> Option<&str> {
        self.attr(VALUE)
    }

    fn attr(&self, local: &str) -> Option<&str> {
        let ddms = self.version.namespace(Space::Ddms).unwrap_or("");
        self.node.attribute(ddms, local)
    }
}

impl Component for Language {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = LANGUAGE.open(node, ctx)?;
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        let qualifier = checks.attribute(ddms, QUALIFIER);
        let value = checks.attribute(ddms, VALUE);

        let mut warnings = Vec::new();
        match (qualifier, value) {
            (Some(_), None) => {
                warnings.push(checks.warn("A qualifier has been set without an accompanying value attribute."))
            }
            (None, Some(_)) => {
                warnings.push(checks.warn("A value has been set without an accompanying qualifier attribute."))
            }
            (None, None) => {
                warnings.push(checks.warn("Neither a qualifier nor a value was set on this language."))
            }
            (Some(_), Some(_)) => {}
        }

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            warnings,
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageBuilder {
    pub qualifier: String,
    pub value: String,
}

impl From<&Language> for LanguageBuilder {
    fn from(language: &Language) -> Self {
        Self {
            qualifier: language.qualifier().unwrap_or_default().to_string(),
            value: language.value().unwrap_or_default().to_string(),
        }
    }
}

impl Builder for LanguageBuilder {
    type Target = Language;

    fn is_empty(&self) -> bool {
        builder::is_blank(&self.qualifier) && builder::is_blank(&self.value)
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Language>> {
        if self.is_empty() {
            return Ok(None);
        }
        Language::new(&self.qualifier, &self.value, ctx).map(Some)
    }
}

/// Date attributes of `ddms:dates` and the version each appeared in
const DATE_FIELDS: [(&str, SchemaVersion); 6] = [
    ("created", SchemaVersion::V2_0),
    ("posted", SchemaVersion::V2_0),
    ("validTil", SchemaVersion::V2_0),
    ("infoCutOff", SchemaVersion::V2_0),
    ("approvedOn", SchemaVersion::V3_1),
    ("receivedOn", SchemaVersion::V4_0_1),
];

/// Lifecycle dates of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct Dates {
    node: ComponentNode,
    version: SchemaVersion,
    warnings: Vec<ValidationMessage>,
}

impl Dates {
    /// `values` pairs attribute names (`created`, `posted`, ...) with dates
    pub fn new(values: &[(&str, &str)], ctx: &RecordContext) -> Result<Self> {
        let mut node = DATES.new_node(ctx)?;
        for (name, _) in DATE_FIELDS {
            let value = values
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, value)| *value);
            node = node.with_optional_attribute(ctx.qname(Space::Ddms, name)?, value);
        }
        Self::from_node(&node, ctx)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let ddms = self.version.namespace(Space::Ddms).unwrap_or("");
        self.node.attribute(ddms, name).filter(|value| !value.trim().is_empty())
    }

    pub fn created(&self) -> Option<&str> {
        self.get("created")
    }

    pub fn posted(&self) -> Option<&str> {
        self.get("posted")
    }
}

impl Component for Dates {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = DATES.open(node, ctx)?;
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        for (name, since) in DATE_FIELDS {
            check_attribute_since(&checks, ddms, name, since, ctx.version())?;
        }

        let mut present = 0;
        for (name, _) in DATE_FIELDS {
            if let Some(value) = checks.attribute(ddms, name) {
                validation::check_date(value, DateRule::Flexible, name, checks.locator())?;
                present += 1;
            }
        }

        let mut warnings = Vec::new();
        if present == 0 {
            warnings.push(checks.warn("A completely empty element was found."));
        }

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            warnings,
        })
    }

    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatesBuilder {
    pub created: String,
    pub posted: String,
    pub valid_til: String,
    pub info_cut_off: String,
    pub approved_on: String,
    pub received_on: String,
}

impl DatesBuilder {
    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("created", self.created.as_str()),
            ("posted", self.posted.as_str()),
            ("validTil", self.valid_til.as_str()),
            ("infoCutOff", self.info_cut_off.as_str()),
            ("approvedOn", self.approved_on.as_str()),
            ("receivedOn", self.received_on.as_str()),
        ]
    }
}

impl From<&Dates> for DatesBuilder {
    fn from(dates: &Dates) -> Self {
        let get = |name| dates.get(name).unwrap_or_default().to_string();
        Self {
            created: get("created"),
            posted: get("posted"),
            valid_til: get("validTil"),
            info_cut_off: get("infoCutOff"),
            approved_on: get("approvedOn"),
            received_on: get("receivedOn"),
        }
    }
}

impl Builder for DatesBuilder {
    type Target = Dates;

    fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| builder::is_blank(value))
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Dates>> {
        if self.is_empty() {
            return Ok(None);
        }
        Dates::new(&self.fields(), ctx).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(version: SchemaVersion) -> RecordContext {
        RecordContext::for_version(version)
    }

    #[test]
    fn test_identifier_requires_uri_qualifier() {
        let ctx = ctx(SchemaVersion::V5_0);
        let id = Identifier::new("URI", "urn:buri:ddmsence:testing", &ctx).unwrap();
        assert_eq!(id.value(), "urn:buri:ddmsence:testing");

        let err = Identifier::new("not a uri", "x", &ctx).unwrap_err();
        assert!(err.to_string().contains("Invalid URI"));

        let err = Identifier::new("URI", "", &ctx).unwrap_err();
        assert_eq!(err.message().unwrap().text(), "The value attribute is required.");
    }

    #[test]
    fn test_language_warns_when_half_set() {
        let ctx = ctx(SchemaVersion::V4_1);
        assert!(Language::new("ISO-639-1", "en", &ctx).unwrap().warnings().is_empty());

        let half = Language::new("ISO-639-1", "", &ctx).unwrap();
        assert_eq!(half.warnings().len(), 1);
        assert!(half.warnings()[0].text().contains("without an accompanying value"));
    }

    #[test]
    fn test_dates_accept_flexible_values() {
        let ctx = ctx(SchemaVersion::V5_0);
        let dates = Dates::new(&[("created", "2003"), ("posted", "2003-02"), ("validTil", "2003-02-15")], &ctx)
            .unwrap();
        assert_eq!(dates.created(), Some("2003"));
        assert!(dates.warnings().is_empty());

        let err = Dates::new(&[("created", "yesterday")], &ctx).unwrap_err();
        assert!(err.to_string().contains("created attribute is not in a valid date format"));
    }

    #[test]
    fn test_empty_dates_warns() {
        let dates = Dates::new(&[], &ctx(SchemaVersion::V5_0)).unwrap();
        let warnings = dates.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].text(), "A completely empty element was found.");
        assert_eq!(warnings[0].locator(), "/ddms:dates");
    }

    #[test]
    fn test_newer_date_attributes_are_gated() {
        let xml = "<ddms:dates xmlns:ddms=\"http://metadata.dod.mil/mdr/ns/DDMS/3.0/\" ddms:approvedOn=\"2010\"/>";
        let err = Dates::from_xml(xml, &ctx(SchemaVersion::V3_0)).unwrap_err();
        assert!(err.to_string().contains("approvedOn attribute cannot be used until DDMS 3.1"));

        let dates = Dates::new(&[("receivedOn", "2010")], &ctx(SchemaVersion::V4_0_1)).unwrap();
        assert_eq!(dates.get("receivedOn"), Some("2010"));
    }

    #[test]
    fn test_dates_builder_round_trip() {
        let ctx = ctx(SchemaVersion::V3_1);
        let dates = Dates::new(&[("posted", "2011-01-01"), ("approvedOn", "2011")], &ctx).unwrap();
        let builder = DatesBuilder::from(&dates);
        assert_eq!(builder.approved_on, "2011");
        assert_eq!(builder.commit(&ctx).unwrap().unwrap(), dates);
        assert!(DatesBuilder::default().commit(&ctx).unwrap().is_none());
    }
}
