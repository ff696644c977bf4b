//! Immutable component tree
//!
//! A [`ComponentNode`] is the generic infoset every concrete component is
//! interpreted from and rendered back to: a qualified name, ordered
//! attributes, ordered children and optional text. Nodes are assembled with
//! consuming `with_*` methods and never change afterwards.

use std::fmt;

use crate::error::{DdmsError, Result};

/// Namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    prefix: String,
    local: String,
    namespace: String,
}

impl QName {
    pub fn new(
        prefix: impl Into<String>,
        local: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
            namespace: namespace.into(),
        }
    }

    /// A name in no namespace
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new("", local, "")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn matches(&self, namespace: &str, local: &str) -> bool {
        self.namespace == namespace && self.local == local
    }

    /// `prefix:local`, or just `local` without a prefix
    pub fn qualified(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: QName,
    value: String,
}

impl Attribute {
    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One element of a record tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNode {
    name: QName,
    attributes: Vec<Attribute>,
    children: Vec<ComponentNode>,
    text: Option<String>,
}

impl ComponentNode {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name,
            value: value.into(),
        });
        self
    }

    /// Adds the attribute only when the value is present and not blank
    pub fn with_optional_attribute(self, name: QName, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.trim().is_empty() => self.with_attribute(name, value),
            _ => self,
        }
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ComponentNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Empty text is treated as no text at all
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
        self
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.matches(namespace, local))
            .map(|attr| attr.value.as_str())
    }

    pub fn children(&self) -> &[ComponentNode] {
        &self.children
    }

    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a ComponentNode> + 'a {
        self.children
            .iter()
            .filter(move |child| child.name.matches(namespace, local))
    }

    pub fn first_child(&self, namespace: &str, local: &str) -> Option<&ComponentNode> {
        self.children
            .iter()
            .find(|child| child.name.matches(namespace, local))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text of this node, or the empty string
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Parse XML text into a node tree rooted at the document element
    pub fn parse(xml: &str) -> Result<ComponentNode> {
        let document = roxmltree::Document::parse(xml)?;
        Ok(Self::from_element(document.root_element()))
    }

    fn from_element(element: roxmltree::Node<'_, '_>) -> ComponentNode {
        let name = Self::qualify(element, element.tag_name().namespace(), element.tag_name().name());
        let mut node = ComponentNode::new(name);

        for attr in element.attributes() {
            let attr_name = Self::qualify(element, attr.namespace(), attr.name());
            node = node.with_attribute(attr_name, attr.value());
        }

        let has_elements = element.children().any(|child| child.is_element());
        if has_elements {
            for child in element.children().filter(|child| child.is_element()) {
                node = node.with_child(Self::from_element(child));
            }
        } else {
            let text: String = element
                .children()
                .filter(|child| child.is_text())
                .filter_map(|child| child.text())
                .collect();
            node = node.with_text(text);
        }

        node
    }

    fn qualify(element: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> QName {
        match namespace {
            Some(uri) => {
                let prefix = element.lookup_prefix(uri).unwrap_or("");
                QName::new(prefix, local, uri)
            }
            None => QName::unqualified(local),
        }
    }

    /// Every (prefix, namespace) pair used in this tree, in first-use order.
    ///
    /// Fails when one prefix is bound to two different namespaces.
    pub fn namespace_declarations(&self) -> Result<Vec<(String, String)>> {
        let mut declarations: Vec<(String, String)> = Vec::new();
        self.collect_declarations(&mut declarations)?;
        Ok(declarations)
    }

    fn collect_declarations(&self, declarations: &mut Vec<(String, String)>) -> Result<()> {
        let mut record = |name: &QName| -> Result<()> {
            if name.namespace().is_empty() || name.prefix() == "xml" {
                return Ok(());
            }
            let bound = declarations
                .iter()
                .find(|(prefix, _)| prefix == name.prefix())
                .map(|(_, uri)| uri.clone());
            match bound {
                None => {
                    declarations.push((name.prefix().to_string(), name.namespace().to_string()));
                    Ok(())
                }
                Some(uri) if uri == name.namespace() => Ok(()),
                Some(uri) => Err(DdmsError::Render(format!(
                    "The prefix \"{}\" is bound to both {} and {}.",
                    name.prefix(),
                    uri,
                    name.namespace()
                ))),
            }
        };
        record(&self.name)?;
        for attr in &self.attributes {
            record(&attr.name)?;
        }
        for child in &self.children {
            child.collect_declarations(declarations)?;
        }
        Ok(())
    }
}
