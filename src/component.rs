//! Generic component lifecycle
//!
//! Every concrete component is interpreted from a [`ComponentNode`] by
//! [`Component::from_node`]. Typed constructors build a node from raw field
//! values and hand it to the same function, so the parse and construct paths
//! share one validation routine. A component that exists has passed every
//! structural rule for the version it was built under.

use std::fmt;

use crate::context::RecordContext;
use crate::error::{DdmsError, Result};
use crate::node::{ComponentNode, QName};
use crate::render;
use crate::validation::{NodeChecks, ValidationMessage};
use crate::version::{SchemaVersion, Space};

/// A validated, immutable record component
pub trait Component: Sized + Clone + PartialEq + fmt::Debug {
    /// Interpret and validate a node under the context's version
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self>;

    fn node(&self) -> &ComponentNode;

    /// The version this component was validated against
    fn version(&self) -> SchemaVersion;

    /// Advisory warnings of this component and copies of its descendants'
    fn warnings(&self) -> &[ValidationMessage];

    fn qualified_name(&self) -> String {
        self.node().name().qualified()
    }

    /// Run validation again on the stored node, under the component's own version
    fn revalidate(&self, ctx: &RecordContext) -> Result<Self> {
        Self::from_node(self.node(), &ctx.with_version(self.version()))
    }

    /// Parse XML text and interpret its root element
    fn from_xml(xml: &str, ctx: &RecordContext) -> Result<Self> {
        let node = ComponentNode::parse(xml)?;
        Self::from_node(&node, ctx)
    }

    fn to_xml(&self) -> Result<String> {
        render::to_xml(self.node())
    }

    fn to_html(&self) -> String {
        render::to_html(self.node())
    }

    fn to_text(&self) -> String {
        render::to_text(self.node())
    }
}

/// Name and version range of one element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDef {
    pub space: Space,
    pub name: &'static str,
    /// Name used from the given version onward
    pub renamed: Option<(SchemaVersion, &'static str)>,
    pub since: SchemaVersion,
    /// Last version the element may appear in
    pub until: Option<SchemaVersion>,
}

impl ElementDef {
    pub const fn new(space: Space, name: &'static str) -> Self {
        Self {
            space,
            name,
            renamed: None,
            since: SchemaVersion::V2_0,
            until: None,
        }
    }

    pub const fn since(mut self, version: SchemaVersion) -> Self {
        self.since = version;
        self
    }

    pub const fn until(mut self, version: SchemaVersion) -> Self {
        self.until = Some(version);
        self
    }

    pub const fn renamed(mut self, version: SchemaVersion, name: &'static str) -> Self {
        self.renamed = Some((version, name));
        self
    }

    pub fn name_for(&self, version: SchemaVersion) -> &'static str {
        match self.renamed {
            Some((from, name)) if version.is_at_least(from) => name,
            _ => self.name,
        }
    }

    pub fn is_applicable(&self, version: SchemaVersion) -> bool {
        version.is_at_least(self.since) && self.until.map_or(true, |until| version <= until)
    }

    /// Reject the element when the active version is outside its range
    pub fn check_applicable(&self, version: SchemaVersion, locator: &str) -> Result<()> {
        let label = format!("{}:{}", self.space.default_prefix(), self.name_for(version));
        if version.is_before(self.since) {
            return Err(DdmsError::invalid(
                format!(
                    "The {} element cannot be used until DDMS {} or later.",
                    label, self.since
                ),
                locator,
            ));
        }
        if let Some(until) = self.until {
            if version > until {
                return Err(DdmsError::invalid(
                    format!(
                        "The {} element cannot be used after DDMS {}.",
                        label, until
                    ),
                    locator,
                ));
            }
        }
        Ok(())
    }

    pub fn qname(&self, ctx: &RecordContext) -> Result<QName> {
        ctx.qname(self.space, self.name_for(ctx.version()))
    }

    /// Namespace URI and local name this element has under the context
    pub fn expected(&self, ctx: &RecordContext) -> (&'static str, &'static str) {
        (
            ctx.namespace_or_empty(self.space),
            self.name_for(ctx.version()),
        )
    }

    /// First two validation steps: version applicability, then name match
    pub fn open<'a>(&self, node: &'a ComponentNode, ctx: &RecordContext) -> Result<NodeChecks<'a>> {
        let checks = NodeChecks::new(node);
        self.check_applicable(ctx.version(), checks.locator())?;
        let (namespace, local) = self.expected(ctx);
        checks.expect_name(namespace, local)?;
        Ok(checks)
    }

    /// Empty node carrying this element's name under the context
    pub fn new_node(&self, ctx: &RecordContext) -> Result<ComponentNode> {
        let name = self.qname(ctx)?;
        self.check_applicable(ctx.version(), &format!("/{}", name))?;
        Ok(ComponentNode::new(name))
    }
}

/// Reject an attribute that is present before the version that introduced it
pub fn check_attribute_since(
    checks: &NodeChecks<'_>,
    namespace: &str,
    local: &str,
    since: SchemaVersion,
    version: SchemaVersion,
) -> Result<()> {
    if version.is_before(since) && checks.attribute(namespace, local).is_some() {
        return Err(checks.fail(format!(
            "The {} attribute cannot be used until DDMS {} or later.",
            local, since
        )));
    }
    Ok(())
}

/// Interpret a child node, prefixing any failure with the parent's name
pub fn child<T: Component>(node: &ComponentNode, parent: &str, ctx: &RecordContext) -> Result<T> {
    T::from_node(node, ctx).map_err(|e| e.located_under(parent))
}
