//! Generic leaf text component
//!
//! Simple elements that carry a text value, security attributes and a few
//! extra attributes share one implementation. A [`LeafDef`] describes the
//! element and [`TextComponent`] applies it.

use crate::builder::{self, Builder};
use crate::component::{Component, ElementDef};
use crate::context::RecordContext;
use crate::error::Result;
use crate::node::ComponentNode;
use crate::security::{SecurityAttributes, SecurityAttributesBuilder};
use crate::validation::{self, DateRule, NodeChecks, ValidationMessage};
use crate::version::{SchemaVersion, Space};

/// How a leaf treats its text value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    Required,
    /// Empty text is legal but reported as a warning
    WarnIfEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkingRule {
    Required,
    Optional,
}

/// Element-specific check run once the common leaf checks have passed
pub type LeafHook = fn(&NodeChecks<'_>, &RecordContext) -> Result<()>;

/// A non-security attribute carried by a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraAttribute {
    pub space: Space,
    pub name: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafDef {
    pub element: ElementDef,
    pub text: TextRule,
    pub marking: MarkingRule,
    pub extras: &'static [ExtraAttribute],
    pub hook: Option<LeafHook>,
}

pub static TITLE: LeafDef = LeafDef {
    element: ElementDef::new(Space::Ddms, "title"),
    text: TextRule::Required,
    marking: MarkingRule::Required,
    extras: &[],
    hook: None,
};

pub static SUBTITLE: LeafDef = LeafDef {
    element: ElementDef::new(Space::Ddms, "subtitle"),
    text: TextRule::Required,
    marking: MarkingRule::Required,
    extras: &[],
    hook: None,
};

pub static DESCRIPTION: LeafDef = LeafDef {
    element: ElementDef::new(Space::Ddms, "description"),
    text: TextRule::WarnIfEmpty,
    marking: MarkingRule::Required,
    extras: &[],
    hook: None,
};

pub static PROCESSING_INFO: LeafDef = LeafDef {
    element: ElementDef::new(Space::Ddms, "processingInfo").since(SchemaVersion::V4_1),
    text: TextRule::Required,
    marking: MarkingRule::Required,
    extras: &[ExtraAttribute {
        space: Space::Ddms,
        name: DATE_PROCESSED,
        required: true,
    }],
    hook: Some(check_date_processed),
};

const DATE_PROCESSED: &str = "dateProcessed";

fn check_date_processed(checks: &NodeChecks<'_>, ctx: &RecordContext) -> Result<()> {
    match checks.attribute(ctx.namespace_or_empty(Space::Ddms), DATE_PROCESSED) {
        Some(value) => validation::check_date(value, DateRule::Full, DATE_PROCESSED, checks.locator()),
        None => Ok(()),
    }
}

/// Every leaf definition, looked up by element name when parsing
pub static LEAF_DEFS: [&LeafDef; 4] = [&TITLE, &SUBTITLE, &DESCRIPTION, &PROCESSING_INFO];

impl LeafDef {
    /// The definition whose element name matches the node under the context
    pub fn lookup(node: &ComponentNode, ctx: &RecordContext) -> Option<&'static LeafDef> {
        LEAF_DEFS.iter().copied().find(|def| {
            let (namespace, local) = def.element.expected(ctx);
            node.name().matches(namespace, local)
        })
    }
}

/// One leaf element validated against its definition
#[derive(Debug, Clone, PartialEq)]
pub struct TextComponent {
    def: &'static LeafDef,
    node: ComponentNode,
    version: SchemaVersion,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl TextComponent {
    /// Build a leaf from field values; `extras` pairs attribute local names with values
    pub fn new(
        def: &'static LeafDef,
        text: &str,
        security: &SecurityAttributes,
        extras: &[(&str, &str)],
        ctx: &RecordContext,
    ) -> Result<Self> {
        let mut node = def.element.new_node(ctx)?;
        for extra in def.extras {
            let value = extras
                .iter()
                .find(|(name, _)| *name == extra.name)
                .map(|(_, value)| *value);
            node = node.with_optional_attribute(ctx.qname(extra.space, extra.name)?, value);
        }
        let node = security.apply(node, ctx)?.with_text(text);
        Self::parse_as(def, &node, ctx)
    }

    pub fn title(text: &str, security: &SecurityAttributes, ctx: &RecordContext) -> Result<Self> {
        Self::new(&TITLE, text, security, &[], ctx)
    }

    pub fn subtitle(text: &str, security: &SecurityAttributes, ctx: &RecordContext) -> Result<Self> {
        Self::new(&SUBTITLE, text, security, &[], ctx)
    }

    pub fn description(text: &str, security: &SecurityAttributes, ctx: &RecordContext) -> Result<Self> {
        Self::new(&DESCRIPTION, text, security, &[], ctx)
    }

    /// Interpret a node against a specific definition
    pub fn parse_as(def: &'static LeafDef, node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = def.element.open(node, ctx)?;

        let text = node.text_or_empty().trim();
        if def.text == TextRule::Required {
            checks.required_text()?;
        }
        for extra in def.extras.iter().filter(|extra| extra.required) {
            checks.required_attribute(ctx.namespace_or_empty(extra.space), extra.name)?;
        }

        let security = SecurityAttributes::from_node(&checks, ctx)?;
        if def.marking == MarkingRule::Required {
            security.require_marking(checks.locator())?;
        }
        if let Some(hook) = def.hook {
            hook(&checks, ctx)?;
        }

        Ok(Self {
            def,
            node: node.clone(),
            version: ctx.version(),
            security,
            warnings: Self::advisories(def, &checks, text),
        })
    }

    fn advisories(def: &LeafDef, checks: &NodeChecks<'_>, text: &str) -> Vec<ValidationMessage> {
        let mut warnings = Vec::new();
        if def.text == TextRule::WarnIfEmpty && text.is_empty() {
            warnings.push(checks.warn(format!(
                "A {} element was found with no value.",
                checks.node().name()
            )));
        }
        warnings
    }

    pub fn def(&self) -> &'static LeafDef {
        self.def
    }

    pub fn value(&self) -> &str {
        self.node.text_or_empty()
    }

    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    /// Value of an extra attribute by local name
    pub fn extra(&self, name: &str) -> Option<&str> {
        let extra = self.def.extras.iter().find(|extra| extra.name == name)?;
        self.node
            .attribute(self.version.namespace(extra.space).unwrap_or(""), extra.name)
    }
}

impl Component for TextComponent {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        match LeafDef::lookup(node, ctx) {
            Some(def) => Self::parse_as(def, node, ctx),
            None => {
                let checks = NodeChecks::new(node);
                Err(checks.fail(format!(
                    "Unexpected namespace URI and local name encountered: {} ({})",
                    node.name(),
                    node.name().namespace()
                )))
            }
        }
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

#[derive(Debug, Clone, PartialEq)]
pub struct TextComponentBuilder {
    def: &'static LeafDef,
    pub text: String,
    pub security: SecurityAttributesBuilder,
    /// Values of the definition's extra attributes, in definition order
    pub extras: Vec<String>,
}

impl TextComponentBuilder {
    pub fn new(def: &'static LeafDef) -> Self {
        Self {
            def,
            text: String::new(),
            security: SecurityAttributesBuilder::default(),
            extras: vec![String::new(); def.extras.len()],
        }
    }

    pub fn def(&self) -> &'static LeafDef {
        self.def
    }
}

impl From<&TextComponent> for TextComponentBuilder {
    fn from(component: &TextComponent) -> Self {
        Self {
            def: component.def,
            text: component.value().to_string(),
            security: SecurityAttributesBuilder::from(&component.security),
            extras: component
                .def
                .extras
                .iter()
                .map(|extra| component.extra(extra.name).unwrap_or_default().to_string())
                .collect(),
        }
    }
}

impl Builder for TextComponentBuilder {
    type Target = TextComponent;

    fn is_empty(&self) -> bool {
        builder::is_blank(&self.text)
            && self.security.is_empty()
            && self.extras.iter().all(|value| builder::is_blank(value))
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<TextComponent>> {
        if self.is_empty() {
            return Ok(None);
        }
        let extras: Vec<(&str, &str)> = self
            .def
            .extras
            .iter()
            .zip(&self.extras)
            .map(|(extra, value)| (extra.name, value.as_str()))
            .collect();
        TextComponent::new(self.def, &self.text, &self.security.to_attributes(), &extras, ctx).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marking() -> SecurityAttributes {
        SecurityAttributes::marking("U", &["USA"])
    }

    #[test]
    fn test_title_renders_canonically() {
        let ctx = RecordContext::for_version(SchemaVersion::V5_0);
        let title = TextComponent::title("Quarterly report", &marking(), &ctx).unwrap();
        assert_eq!(
            title.to_xml().unwrap(),
            "<ddms:title xmlns:ddms=\"urn:us:mil:ces:metadata:ddms:5\" xmlns:ism=\"urn:us:gov:ic:ism\" \
             ism:classification=\"U\" ism:ownerProducer=\"USA\">Quarterly report</ddms:title>"
        );
        assert_eq!(
            title.to_text(),
            "title.classification = U\ntitle.ownerProducer = USA\ntitle = Quarterly report\n"
        );
    }

    #[test]
    fn test_title_requires_text_and_marking() {
        let ctx = RecordContext::for_version(SchemaVersion::V5_0);
        let err = TextComponent::title("", &marking(), &ctx).unwrap_err();
        assert!(err.to_string().contains("requires child text"));

        let err = TextComponent::title("Report", &SecurityAttributes::default(), &ctx).unwrap_err();
        assert!(err.to_string().contains("classification attribute is required"));
    }

    #[test]
    fn test_empty_description_warns() {
        let ctx = RecordContext::for_version(SchemaVersion::V3_1);
        let description = TextComponent::description("", &marking(), &ctx).unwrap();
        assert_eq!(description.warnings().len(), 1);
        assert_eq!(description.warnings()[0].locator(), "/ddms:description");
    }

    #[test]
    fn test_processing_info_needs_4_1_and_full_date() {
        let info = |version: SchemaVersion, date: &str| {
            TextComponent::new(
                &PROCESSING_INFO,
                "Converted",
                &marking(),
                &[("dateProcessed", date)],
                &RecordContext::for_version(version),
            )
        };

        let err = info(SchemaVersion::V4_0_1, "2011-08-31").unwrap_err();
        assert!(err.to_string().contains("cannot be used until DDMS 4.1"));

        let err = info(SchemaVersion::V4_1, "2011").unwrap_err();
        assert!(err.to_string().contains("dateProcessed attribute is not in a valid date format"));

        let err = info(SchemaVersion::V4_1, "").unwrap_err();
        assert!(err.to_string().contains("dateProcessed attribute is required"));

        let ok = info(SchemaVersion::V4_1, "2011-08-31").unwrap();
        assert_eq!(ok.extra("dateProcessed"), Some("2011-08-31"));
    }

    #[test]
    fn test_hook_runs_after_common_checks() {
        fn no_drafts(checks: &NodeChecks<'_>, _ctx: &RecordContext) -> Result<()> {
            if checks.node().text_or_empty().contains("DRAFT") {
                return Err(checks.fail("Drafts cannot be published."));
            }
            Ok(())
        }
        static RELEASED_TITLE: LeafDef = LeafDef {
            element: ElementDef::new(Space::Ddms, "title"),
            text: TextRule::Required,
            marking: MarkingRule::Required,
            extras: &[],
            hook: Some(no_drafts),
        };

        let ctx = RecordContext::for_version(SchemaVersion::V5_0);
        let new = |text: &str, security: &SecurityAttributes| {
            TextComponent::new(&RELEASED_TITLE, text, security, &[], &ctx)
        };

        let err = new("DRAFT report", &marking()).unwrap_err();
        assert_eq!(err.message().unwrap().text(), "Drafts cannot be published.");
        assert_eq!(err.message().unwrap().locator(), "/ddms:title");

        // Structural failures are reported before the hook is consulted
        let err = new("DRAFT report", &SecurityAttributes::default()).unwrap_err();
        assert!(err.to_string().contains("classification attribute is required"));

        assert!(new("Final report", &marking()).is_ok());
    }

    #[test]
    fn test_from_node_dispatches_on_name() {
        let ctx = RecordContext::for_version(SchemaVersion::V5_0);
        let subtitle = TextComponent::subtitle("Part 2", &marking(), &ctx).unwrap();
        let parsed = TextComponent::from_xml(&subtitle.to_xml().unwrap(), &ctx).unwrap();
        assert!(std::ptr::eq(parsed.def(), &SUBTITLE));
        assert_eq!(parsed, subtitle);

        let err = TextComponent::from_xml(
            "<ddms:keyword xmlns:ddms=\"urn:us:mil:ces:metadata:ddms:5\"/>",
            &ctx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unexpected namespace URI and local name"));
    }

    #[test]
    fn test_builder_edits_and_empty_commit() {
        let ctx = RecordContext::for_version(SchemaVersion::V4_1);
        assert!(TextComponentBuilder::new(&TITLE).commit(&ctx).unwrap().is_none());

        let title = TextComponent::title("Draft", &marking(), &ctx).unwrap();
        let mut builder = TextComponentBuilder::from(&title);
        builder.text = "Final".to_string();
        let edited = builder.commit(&ctx).unwrap().unwrap();
        assert_eq!(edited.value(), "Final");
        assert_eq!(edited.security_attributes(), title.security_attributes());
    }
}
