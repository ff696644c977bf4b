//! ISM security attributes and the `ddms:security` element
//!
//! The attribute group can decorate most components. Values are checked
//! against the controlled vocabularies of the context's version.

use crate::builder::{self, Builder};
use crate::component::{Component, ElementDef};
use crate::context::RecordContext;
use crate::error::{DdmsError, Result};
use crate::node::ComponentNode;
use crate::validation::{self, NodeChecks, ValidationMessage};
use crate::version::{SchemaVersion, Space};
use crate::vocabulary::{CLASSIFICATION, DISSEMINATION, OWNER_PRODUCER, SCI_CONTROLS};

const CLASSIFICATION_ATTR: &str = "classification";
const OWNER_PRODUCER_ATTR: &str = "ownerProducer";
const SCI_CONTROLS_ATTR: &str = "SCIcontrols";
const DISSEMINATION_ATTR: &str = "disseminationControls";
const RELEASABLE_TO_ATTR: &str = "releasableTo";
const COMPILATION_REASON_ATTR: &str = "compilationReason";
const EXCLUDE_FROM_ROLLUP_ATTR: &str = "excludeFromRollup";

const COMPILATION_REASON_SINCE: SchemaVersion = SchemaVersion::V3_0;

/// The ISM attribute group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityAttributes {
    classification: Option<String>,
    owner_producers: Vec<String>,
    sci_controls: Vec<String>,
    dissemination_controls: Vec<String>,
    releasable_to: Vec<String>,
    compilation_reason: Option<String>,
}

impl SecurityAttributes {
    /// A `classification` plus `ownerProducer` marking
    pub fn marking(classification: &str, owner_producers: &[&str]) -> Self {
        Self {
            classification: Some(classification.to_string()),
            owner_producers: owner_producers.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_sci_controls(mut self, values: &[&str]) -> Self {
        self.sci_controls = values.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_dissemination_controls(mut self, values: &[&str]) -> Self {
        self.dissemination_controls = values.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_releasable_to(mut self, values: &[&str]) -> Self {
        self.releasable_to = values.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_compilation_reason(mut self, reason: &str) -> Self {
        self.compilation_reason = builder::non_blank(reason).map(str::to_string);
        self
    }

    /// Read and validate the attribute group from a node.
    ///
    /// Validation runs version gating, then token formats, then vocabulary
    /// membership, then cross-field rules.
    pub fn from_node(checks: &NodeChecks<'_>, ctx: &RecordContext) -> Result<Self> {
        let ism = ctx.namespace_or_empty(Space::Ism);
        let list = |local: &str| {
            checks
                .attribute(ism, local)
                .map(builder::tokens)
                .unwrap_or_default()
        };

        let attributes = Self {
            classification: checks.attribute(ism, CLASSIFICATION_ATTR).map(str::to_string),
            owner_producers: list(OWNER_PRODUCER_ATTR),
            sci_controls: list(SCI_CONTROLS_ATTR),
            dissemination_controls: list(DISSEMINATION_ATTR),
            releasable_to: list(RELEASABLE_TO_ATTR),
            compilation_reason: checks
                .attribute(ism, COMPILATION_REASON_ATTR)
                .map(str::to_string),
        };
        attributes.validate(ctx, checks.locator())?;
        Ok(attributes)
    }

    pub fn validate(&self, ctx: &RecordContext, locator: &str) -> Result<()> {
        let version = ctx.version();
        if self.compilation_reason.is_some() && version.is_before(COMPILATION_REASON_SINCE) {
            return Err(DdmsError::invalid(
                format!(
                    "The {} attribute cannot be used until DDMS {} or later.",
                    COMPILATION_REASON_ATTR, COMPILATION_REASON_SINCE
                ),
                locator,
            ));
        }

        validation::check_nmtokens(&self.owner_producers, OWNER_PRODUCER_ATTR, locator)?;
        validation::check_nmtokens(&self.sci_controls, SCI_CONTROLS_ATTR, locator)?;
        validation::check_nmtokens(&self.dissemination_controls, DISSEMINATION_ATTR, locator)?;
        validation::check_nmtokens(&self.releasable_to, RELEASABLE_TO_ATTR, locator)?;

        if let Some(classification) = &self.classification {
            validation::check_vocabulary(ctx, CLASSIFICATION, classification, CLASSIFICATION_ATTR, locator)?;
        }
        let lists = [
            (&self.owner_producers, OWNER_PRODUCER, OWNER_PRODUCER_ATTR),
            (&self.sci_controls, SCI_CONTROLS, SCI_CONTROLS_ATTR),
            (&self.dissemination_controls, DISSEMINATION, DISSEMINATION_ATTR),
            (&self.releasable_to, OWNER_PRODUCER, RELEASABLE_TO_ATTR),
        ];
        for (values, key, label) in lists {
            for value in values {
                validation::check_vocabulary(ctx, key, value, label, locator)?;
            }
        }

        if self.classification.is_none() && !self.owner_producers.is_empty() {
            return Err(DdmsError::invalid(
                "The ownerProducer attribute cannot be used without a classification.",
                locator,
            ));
        }
        Ok(())
    }

    /// Fails unless both `classification` and `ownerProducer` are set
    pub fn require_marking(&self, locator: &str) -> Result<()> {
        if self.classification.is_none() {
            return Err(DdmsError::invalid("The classification attribute is required.", locator));
        }
        if self.owner_producers.is_empty() {
            return Err(DdmsError::invalid(
                "At least one ownerProducer must exist.",
                locator,
            ));
        }
        Ok(())
    }

    /// Write the non-empty attributes onto a node, in canonical order
    pub fn apply(&self, node: ComponentNode, ctx: &RecordContext) -> Result<ComponentNode> {
        if self.is_empty() {
            return Ok(node);
        }
        let join = |values: &[String]| (!values.is_empty()).then(|| values.join(" "));
        let fields = [
            (CLASSIFICATION_ATTR, self.classification.clone()),
            (OWNER_PRODUCER_ATTR, join(&self.owner_producers)),
            (SCI_CONTROLS_ATTR, join(&self.sci_controls)),
            (DISSEMINATION_ATTR, join(&self.dissemination_controls)),
            (RELEASABLE_TO_ATTR, join(&self.releasable_to)),
            (COMPILATION_REASON_ATTR, self.compilation_reason.clone()),
        ];

        let mut node = node;
        for (local, value) in fields {
            node = node.with_optional_attribute(ctx.qname(Space::Ism, local)?, value.as_deref());
        }
        Ok(node)
    }

    pub fn is_empty(&self) -> bool {
        self.classification.is_none()
            && self.owner_producers.is_empty()
            && self.sci_controls.is_empty()
            && self.dissemination_controls.is_empty()
            && self.releasable_to.is_empty()
            && self.compilation_reason.is_none()
    }

    pub fn classification(&self) -> Option<&str> {
        self.classification.as_deref()
    }

    pub fn owner_producers(&self) -> &[String] {
        &self.owner_producers
    }

    pub fn sci_controls(&self) -> &[String] {
        &self.sci_controls
    }

    pub fn dissemination_controls(&self) -> &[String] {
        &self.dissemination_controls
    }

    pub fn releasable_to(&self) -> &[String] {
        &self.releasable_to
    }

    pub fn compilation_reason(&self) -> Option<&str> {
        self.compilation_reason.as_deref()
    }
}

/// Editable form of [`SecurityAttributes`]; list fields are space separated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityAttributesBuilder {
    pub classification: String,
    pub owner_producers: String,
    pub sci_controls: String,
    pub dissemination_controls: String,
    pub releasable_to: String,
    pub compilation_reason: String,
}

impl SecurityAttributesBuilder {
    /// Unvalidated attribute values; the owning component validates them
    pub fn to_attributes(&self) -> SecurityAttributes {
        SecurityAttributes {
            classification: builder::non_blank(&self.classification).map(str::to_string),
            owner_producers: builder::tokens(&self.owner_producers),
            sci_controls: builder::tokens(&self.sci_controls),
            dissemination_controls: builder::tokens(&self.dissemination_controls),
            releasable_to: builder::tokens(&self.releasable_to),
            compilation_reason: builder::non_blank(&self.compilation_reason).map(str::to_string),
        }
    }
}

impl From<&SecurityAttributes> for SecurityAttributesBuilder {
    fn from(attributes: &SecurityAttributes) -> Self {
        Self {
            classification: attributes.classification.clone().unwrap_or_default(),
            owner_producers: attributes.owner_producers.join(" "),
            sci_controls: attributes.sci_controls.join(" "),
            dissemination_controls: attributes.dissemination_controls.join(" "),
            releasable_to: attributes.releasable_to.join(" "),
            compilation_reason: attributes.compilation_reason.clone().unwrap_or_default(),
        }
    }
}

impl Builder for SecurityAttributesBuilder {
    type Target = SecurityAttributes;

    fn is_empty(&self) -> bool {
        self.to_attributes().is_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<SecurityAttributes>> {
        let attributes = self.to_attributes();
        if attributes.is_empty() {
            return Ok(None);
        }
        attributes.validate(ctx, "/")?;
        Ok(Some(attributes))
    }
}

const SECURITY: ElementDef = ElementDef::new(Space::Ddms, "security");

/// The resource-level `ddms:security` element
#[derive(Debug, Clone, PartialEq)]
pub struct Security {
    node: ComponentNode,
    version: SchemaVersion,
    attributes: SecurityAttributes,
}

impl Security {
    pub fn new(attributes: &SecurityAttributes, ctx: &RecordContext) -> Result<Self> {
        let mut node = SECURITY.new_node(ctx)?;
        if ctx.version().is_at_least(SchemaVersion::V3_0) {
            node = node.with_attribute(ctx.qname(Space::Ism, EXCLUDE_FROM_ROLLUP_ATTR)?, "true");
        }
        let node = attributes.apply(node, ctx)?;
        Self::from_node(&node, ctx)
    }

    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.attributes
    }
}

impl Component for Security {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = SECURITY.open(node, ctx)?;
        let ism = ctx.namespace_or_empty(Space::Ism);

        let exclude = checks.attribute(ism, EXCLUDE_FROM_ROLLUP_ATTR);
        if ctx.version().is_at_least(SchemaVersion::V3_0) {
            let exclude = checks.required_attribute(ism, EXCLUDE_FROM_ROLLUP_ATTR)?;
            if !validation::check_boolean(exclude, EXCLUDE_FROM_ROLLUP_ATTR, checks.locator())? {
                return Err(checks.fail(
                    "The excludeFromRollup attribute must have a fixed value of \"true\".",
                ));
            }
        } else if exclude.is_some() {
            return Err(checks.fail(format!(
                "The {} attribute cannot be used until DDMS 3.0 or later.",
                EXCLUDE_FROM_ROLLUP_ATTR
            )));
        }

        let attributes = SecurityAttributes::from_node(&checks, ctx)?;
        attributes.require_marking(checks.locator())?;

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            attributes,
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
pub struct SecurityBuilder {
    pub attributes: SecurityAttributesBuilder,
}

impl From<&Security> for SecurityBuilder {
    fn from(security: &Security) -> Self {
        Self {
            attributes: SecurityAttributesBuilder::from(&security.attributes),
        }
    }
}

impl Builder for SecurityBuilder {
    type Target = Security;

    fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Security>> {
        if self.is_empty() {
            return Ok(None);
        }
        Security::new(&self.attributes.to_attributes(), ctx).map(Some)
    }
}
