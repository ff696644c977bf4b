//! Subject coverage: keywords and categories
use std::collections::HashSet;

use crate::builder::{self, Builder, BuilderList};
use crate::component::{self, Component, ElementDef};
use crate::context::RecordContext;
use crate::error::Result;
use crate::node::ComponentNode;
use crate::security::{SecurityAttributes, SecurityAttributesBuilder};
use crate::validation::{self, NodeChecks, ValidationMessage, adopt_warnings};
use crate::version::{SchemaVersion, Space};

const KEYWORD: ElementDef = ElementDef::new(Space::Ddms, "keyword");
const CATEGORY: ElementDef = ElementDef::new(Space::Ddms, "category");
const SUBJECT_COVERAGE: ElementDef = ElementDef::new(Space::Ddms, "subjectCoverage");
/// Wrapper between `subjectCoverage` and its content before 4.0.1
const SUBJECT: ElementDef = ElementDef::new(Space::Ddms, "Subject").until(SchemaVersion::V3_1);

const VALUE: &str = "value";
const QUALIFIER: &str = "qualifier";
const CODE: &str = "code";
const LABEL: &str = "label";

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    node: ComponentNode,
    version: SchemaVersion,
}

impl Keyword {
    pub fn new(value: &str, ctx: &RecordContext) -> Result<Self> {
        let node = KEYWORD
            .new_node(ctx)?
            .with_optional_attribute(ctx.qname(Space::Ddms, VALUE)?, Some(value));
        Self::from_node(&node, ctx)
    }

    pub fn value(&self) -> &str {
        let ddms = self.version.namespace(Space::Ddms).unwrap_or("");
        self.node.attribute(ddms, VALUE).unwrap_or_default()
    }
}

impl Component for Keyword {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = KEYWORD.open(node, ctx)?;
        checks.required_attribute(ctx.namespace_or_empty(Space::Ddms), VALUE)?;
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
pub struct KeywordBuilder {
    pub value: String,
}

impl From<&Keyword> for KeywordBuilder {
    fn from(keyword: &Keyword) -> Self {
        Self {
            value: keyword.value().to_string(),
        }
    }
}

impl Builder for KeywordBuilder {
    type Target = Keyword;

    fn is_empty(&self) -> bool {
        builder::is_blank(&self.value)
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Keyword>> {
        if self.is_empty() {
            return Ok(None);
        }
        Keyword::new(&self.value, ctx).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    node: ComponentNode,
    version: SchemaVersion,
}

impl Category {
    pub fn new(qualifier: Option<&str>, code: Option<&str>, label: &str, ctx: &RecordContext) -> Result<Self> {
        let node = CATEGORY
            .new_node(ctx)?
            .with_optional_attribute(ctx.qname(Space::Ddms, QUALIFIER)?, qualifier)
            .with_optional_attribute(ctx.qname(Space::Ddms, CODE)?, code)
            .with_optional_attribute(ctx.qname(Space::Ddms, LABEL)?, Some(label));
        Self::from_node(&node, ctx)
    }

    fn attr(&self, local: &str) -> Option<&str> {
        let ddms = self.version.namespace(Space::Ddms).unwrap_or("");
        self.node.attribute(ddms, local)
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.attr(QUALIFIER)
    }

    pub fn code(&self) -> Option<&str> {
        self.attr(CODE)
    }

    pub fn label(&self) -> &str {
        self.attr(LABEL).unwrap_or_default()
    }
}

impl Component for Category {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = CATEGORY.open(node, ctx)?;
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        checks.required_attribute(ddms, LABEL)?;
        if let Some(qualifier) = checks.attribute(ddms, QUALIFIER) {
            validation::check_uri(qualifier, QUALIFIER, checks.locator())?;
        }
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
pub struct CategoryBuilder {
    pub qualifier: String,
    pub code: String,
    pub label: String,
}

impl From<&Category> for CategoryBuilder {
    fn from(category: &Category) -> Self {
        Self {
            qualifier: category.qualifier().unwrap_or_default().to_string(),
            code: category.code().unwrap_or_default().to_string(),
            label: category.label().to_string(),
        }
    }
}

impl Builder for CategoryBuilder {
    type Target = Category;

    fn is_empty(&self) -> bool {
        builder::is_blank(&self.qualifier) && builder::is_blank(&self.code) && builder::is_blank(&self.label)
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Category>> {
        if self.is_empty() {
            return Ok(None);
        }
        Category::new(
            builder::non_blank(&self.qualifier),
            builder::non_blank(&self.code),
            &self.label,
            ctx,
        )
        .map(Some)
    }
}

/// Keywords and categories describing what the resource is about
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCoverage {
    node: ComponentNode,
    version: SchemaVersion,
    keywords: Vec<Keyword>,
    categories: Vec<Category>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl SubjectCoverage {
    pub fn new(
        keywords: &[Keyword],
        categories: &[Category],
        security: &SecurityAttributes,
        ctx: &RecordContext,
    ) -> Result<Self> {
        let content = keywords
            .iter()
            .map(|keyword| keyword.node().clone())
            .chain(categories.iter().map(|category| category.node().clone()));

        let mut node = SUBJECT_COVERAGE.new_node(ctx)?;
        if SUBJECT.is_applicable(ctx.version()) {
            node = node.with_child(SUBJECT.new_node(ctx)?.with_children(content));
        } else {
            node = node.with_children(content);
        }
        let node = security.apply(node, ctx)?;
        Self::from_node(&node, ctx)
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    fn advisories(checks: &NodeChecks<'_>, keywords: &[Keyword]) -> Vec<ValidationMessage> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        if keywords.iter().any(|keyword| !seen.insert(keyword.value())) {
            warnings.push(checks.warn("1 or more keywords have the same value."));
        }
        warnings
    }
}

impl Component for SubjectCoverage {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = SUBJECT_COVERAGE.open(node, ctx)?;
        let parent = node.name().qualified();

        // Before 4.0.1 the content sits inside a single ddms:Subject
        let (content, breadcrumb) = if SUBJECT.is_applicable(ctx.version()) {
            let (namespace, local) = SUBJECT.expected(ctx);
            let wrappers = checks.children(namespace, local);
            checks.exactly(wrappers.len(), 1, "Subject element")?;
            let wrapper = wrappers[0];
            (wrapper, format!("{}/{}", parent, wrapper.name().qualified()))
        } else {
            (node, parent.clone())
        };

        let (ddms, keyword) = KEYWORD.expected(ctx);
        let (_, category) = CATEGORY.expected(ctx);
        let inner = NodeChecks::new(content);
        inner
            .only_children(&[(ddms, keyword), (ddms, category)])
            .map_err(|e| if std::ptr::eq(content, node) { e } else { e.located_under(&parent) })?;

        let keyword_nodes = inner.children(ddms, keyword);
        let category_nodes = inner.children(ddms, category);
        checks.at_least(
            keyword_nodes.len() + category_nodes.len(),
            1,
            "keyword or category",
        )?;

        let keywords = keyword_nodes
            .into_iter()
            .map(|child| component::child::<Keyword>(child, &breadcrumb, ctx))
            .collect::<Result<Vec<_>>>()?;
        let categories = category_nodes
            .into_iter()
            .map(|child| component::child::<Category>(child, &breadcrumb, ctx))
            .collect::<Result<Vec<_>>>()?;

        let security = SecurityAttributes::from_node(&checks, ctx)?;

        let mut warnings = Self::advisories(&checks, &keywords);
        for keyword in &keywords {
            adopt_warnings(&mut warnings, &breadcrumb, keyword.warnings());
        }
        for category in &categories {
            adopt_warnings(&mut warnings, &breadcrumb, category.warnings());
        }

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            keywords,
            categories,
            security,
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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectCoverageBuilder {
    pub keywords: BuilderList<KeywordBuilder>,
    pub categories: BuilderList<CategoryBuilder>,
    pub security: SecurityAttributesBuilder,
}

impl From<&SubjectCoverage> for SubjectCoverageBuilder {
    fn from(subject: &SubjectCoverage) -> Self {
        Self {
            keywords: subject.keywords.iter().map(KeywordBuilder::from).collect(),
            categories: subject.categories.iter().map(CategoryBuilder::from).collect(),
            security: SecurityAttributesBuilder::from(&subject.security),
        }
    }
}

impl Builder for SubjectCoverageBuilder {
    type Target = SubjectCoverage;

    fn is_empty(&self) -> bool {
        self.keywords.all_empty() && self.categories.all_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<SubjectCoverage>> {
        if self.is_empty() {
            return Ok(None);
        }
        let keywords = self.keywords.commit_all(ctx)?;
        let categories = self.categories.commit_all(ctx)?;
        SubjectCoverage::new(&keywords, &categories, &self.security.to_attributes(), ctx).map(Some)
    }
}
