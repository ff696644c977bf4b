//! The top-level record document
//!
//! A [`Resource`] is an ordered list of [`TopLevel`] components plus the
//! resource-wide ISM attributes. Parsing classifies each child by name and
//! dispatches it to the matching component; construction takes the
//! components as the caller tagged them.

use crate::builder::{self, Builder, BuilderList};
use crate::catalog::geospatial::{GeospatialCoverage, GeospatialCoverageBuilder};
use crate::catalog::producer::{ProducerKind, ProducerRole, ProducerRoleBuilder};
use crate::catalog::subject::{SubjectCoverage, SubjectCoverageBuilder};
use crate::catalog::summary::{Dates, DatesBuilder, Identifier, IdentifierBuilder, Language, LanguageBuilder};
use crate::component::{Component, ElementDef, check_attribute_since};
use crate::context::RecordContext;
use crate::error::Result;
use crate::leaf::{self, LeafDef, TextComponent, TextComponentBuilder};
use crate::node::ComponentNode;
use crate::security::{Security, SecurityAttributes, SecurityAttributesBuilder, SecurityBuilder};
use crate::validation::{self, DateRule, NodeChecks, ValidationMessage, adopt_warnings};
use crate::version::{SchemaVersion, Space};

const RESOURCE: ElementDef = ElementDef::new(Space::Ddms, "Resource").renamed(SchemaVersion::V5_0, "resource");

const RESOURCE_ELEMENT: &str = "resourceElement";
const CREATE_DATE: &str = "createDate";
const DES_VERSION: &str = "DESVersion";

/// Version from which the resource header attributes are required
const HEADER_SINCE: SchemaVersion = SchemaVersion::V3_0;

/// Any component that may appear directly under a resource
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Identifier(Identifier),
    /// Title, subtitle, description or processing information
    Text(TextComponent),
    Language(Language),
    Dates(Dates),
    Producer(ProducerRole),
    SubjectCoverage(SubjectCoverage),
    GeospatialCoverage(GeospatialCoverage),
    Security(Security),
}

impl TopLevel {
    /// Interpret a child of a resource by its element name
    pub fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        match Slot::of(node, ctx) {
            Some(Slot::Identifier) => Identifier::from_node(node, ctx).map(TopLevel::Identifier),
            Some(Slot::Text(def)) => TextComponent::parse_as(def, node, ctx).map(TopLevel::Text),
            Some(Slot::Language) => Language::from_node(node, ctx).map(TopLevel::Language),
            Some(Slot::Dates) => Dates::from_node(node, ctx).map(TopLevel::Dates),
            Some(Slot::Producer(kind)) => ProducerRole::parse_as(kind, node, ctx).map(TopLevel::Producer),
            Some(Slot::SubjectCoverage) => SubjectCoverage::from_node(node, ctx).map(TopLevel::SubjectCoverage),
            Some(Slot::GeospatialCoverage) => {
                GeospatialCoverage::from_node(node, ctx).map(TopLevel::GeospatialCoverage)
            }
            Some(Slot::Security) => Security::from_node(node, ctx).map(TopLevel::Security),
            None => Err(NodeChecks::new(node).fail(format!(
                "Unexpected namespace URI and local name encountered: {} ({})",
                node.name(),
                node.name().namespace()
            ))),
        }
    }

    pub fn node(&self) -> &ComponentNode {
        match self {
            TopLevel::Identifier(c) => c.node(),
            TopLevel::Text(c) => c.node(),
            TopLevel::Language(c) => c.node(),
            TopLevel::Dates(c) => c.node(),
            TopLevel::Producer(c) => c.node(),
            TopLevel::SubjectCoverage(c) => c.node(),
            TopLevel::GeospatialCoverage(c) => c.node(),
            TopLevel::Security(c) => c.node(),
        }
    }

    pub fn warnings(&self) -> &[ValidationMessage] {
        match self {
            TopLevel::Identifier(c) => c.warnings(),
            TopLevel::Text(c) => c.warnings(),
            TopLevel::Language(c) => c.warnings(),
            TopLevel::Dates(c) => c.warnings(),
            TopLevel::Producer(c) => c.warnings(),
            TopLevel::SubjectCoverage(c) => c.warnings(),
            TopLevel::GeospatialCoverage(c) => c.warnings(),
            TopLevel::Security(c) => c.warnings(),
        }
    }
}

macro_rules! top_level_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TopLevel {
                fn from(component: $ty) -> Self {
                    TopLevel::$variant(component)
                }
            }
        )*
    };
}

top_level_from! {
    Identifier => Identifier,
    Text => TextComponent,
    Language => Language,
    Dates => Dates,
    Producer => ProducerRole,
    SubjectCoverage => SubjectCoverage,
    GeospatialCoverage => GeospatialCoverage,
    Security => Security,
}

/// What a resource child is, decided from its name alone
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Identifier,
    Text(&'static LeafDef),
    Language,
    Dates,
    Producer(ProducerKind),
    SubjectCoverage,
    GeospatialCoverage,
    Security,
}

impl Slot {
    fn of(node: &ComponentNode, ctx: &RecordContext) -> Option<Slot> {
        if let Some(def) = LeafDef::lookup(node, ctx) {
            return Some(Slot::Text(def));
        }
        if let Some(kind) = ProducerKind::for_node(node, ctx) {
            return Some(Slot::Producer(kind));
        }
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        if node.name().namespace() != ddms {
            return None;
        }
        match node.name().local() {
            "identifier" => Some(Slot::Identifier),
            "language" => Some(Slot::Language),
            "dates" => Some(Slot::Dates),
            "subjectCoverage" => Some(Slot::SubjectCoverage),
            "geospatialCoverage" => Some(Slot::GeospatialCoverage),
            "security" => Some(Slot::Security),
            _ => None,
        }
    }
}

/// Resource-wide ISM attributes, required from DDMS 3.0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHeader {
    pub resource_element: bool,
    pub create_date: String,
    pub des_version: u32,
}

/// A complete metadata record
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    node: ComponentNode,
    version: SchemaVersion,
    components: Vec<TopLevel>,
    header: Option<ResourceHeader>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl Resource {
    pub fn new(
        components: &[TopLevel],
        header: Option<&ResourceHeader>,
        security: &SecurityAttributes,
        ctx: &RecordContext,
    ) -> Result<Self> {
        let mut node = RESOURCE.new_node(ctx)?;
        if let Some(header) = header {
            node = node
                .with_attribute(
                    ctx.qname(Space::Ism, RESOURCE_ELEMENT)?,
                    header.resource_element.to_string(),
                )
                .with_optional_attribute(ctx.qname(Space::Ism, CREATE_DATE)?, Some(header.create_date.as_str()))
                .with_attribute(ctx.qname(Space::Ism, DES_VERSION)?, header.des_version.to_string());
        }
        let node = security
            .apply(node, ctx)?
            .with_children(components.iter().map(|component| component.node().clone()));
        Self::from_node(&node, ctx)
    }

    pub fn components(&self) -> &[TopLevel] {
        &self.components
    }

    pub fn header(&self) -> Option<&ResourceHeader> {
        self.header.as_ref()
    }

    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.components.iter().filter_map(|c| match c {
            TopLevel::Identifier(identifier) => Some(identifier),
            _ => None,
        })
    }

    /// Leaf components of one definition, e.g. [`leaf::TITLE`]
    pub fn texts(&self, def: &'static LeafDef) -> impl Iterator<Item = &TextComponent> {
        self.components.iter().filter_map(move |c| match c {
            TopLevel::Text(text) if std::ptr::eq(text.def(), def) => Some(text),
            _ => None,
        })
    }

    pub fn titles(&self) -> impl Iterator<Item = &TextComponent> {
        self.texts(&leaf::TITLE)
    }

    pub fn description(&self) -> Option<&TextComponent> {
        self.texts(&leaf::DESCRIPTION).next()
    }

    pub fn dates(&self) -> Option<&Dates> {
        self.components.iter().find_map(|c| match c {
            TopLevel::Dates(dates) => Some(dates),
            _ => None,
        })
    }

    pub fn producers(&self) -> impl Iterator<Item = &ProducerRole> {
        self.components.iter().filter_map(|c| match c {
            TopLevel::Producer(role) => Some(role),
            _ => None,
        })
    }

    pub fn subject_coverages(&self) -> impl Iterator<Item = &SubjectCoverage> {
        self.components.iter().filter_map(|c| match c {
            TopLevel::SubjectCoverage(subject) => Some(subject),
            _ => None,
        })
    }

    pub fn security(&self) -> Option<&Security> {
        self.components.iter().find_map(|c| match c {
            TopLevel::Security(security) => Some(security),
            _ => None,
        })
    }

    fn check_cardinality(checks: &NodeChecks<'_>, slots: &[Slot]) -> Result<()> {
        let count = |wanted: fn(&Slot) -> bool| slots.iter().filter(|slot| wanted(slot)).count();
        let text = |def: &'static LeafDef| {
            slots
                .iter()
                .filter(|slot| matches!(slot, Slot::Text(d) if std::ptr::eq(*d, def)))
                .count()
        };

        checks.at_least(count(|s| matches!(s, Slot::Identifier)), 1, "identifier")?;
        checks.at_least(text(&leaf::TITLE), 1, "title")?;
        checks.at_least(count(|s| matches!(s, Slot::Producer(_))), 1, "producer role")?;
        checks.at_least(count(|s| matches!(s, Slot::SubjectCoverage)), 1, "subjectCoverage")?;
        checks.exactly(count(|s| matches!(s, Slot::Security)), 1, "security element")?;
        checks.at_most(text(&leaf::DESCRIPTION), 1, "description")?;
        checks.at_most(count(|s| matches!(s, Slot::Dates)), 1, "dates element")?;
        Ok(())
    }

    fn read_header(checks: &NodeChecks<'_>, ctx: &RecordContext) -> Result<Option<ResourceHeader>> {
        let ism = ctx.namespace_or_empty(Space::Ism);
        let version = ctx.version();
        for local in [RESOURCE_ELEMENT, CREATE_DATE, DES_VERSION] {
            check_attribute_since(checks, ism, local, HEADER_SINCE, version)?;
        }
        if version.is_before(HEADER_SINCE) {
            return Ok(None);
        }

        let resource_element = checks.required_attribute(ism, RESOURCE_ELEMENT)?;
        let create_date = checks.required_attribute(ism, CREATE_DATE)?;
        let des_version = checks.required_attribute(ism, DES_VERSION)?;

        let locator = checks.locator();
        let resource_element = validation::check_boolean(resource_element, RESOURCE_ELEMENT, locator)?;
        validation::check_date(create_date, DateRule::Full, CREATE_DATE, locator)?;
        let des_version = validation::check_positive_integer(des_version, DES_VERSION, locator)?;

        Ok(Some(ResourceHeader {
            resource_element,
            create_date: create_date.trim().to_string(),
            des_version,
        }))
    }
}

impl Component for Resource {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = RESOURCE.open(node, ctx)?;
        let parent = node.name().qualified();

        let mut slots = Vec::with_capacity(node.children().len());
        for child in node.children() {
            match Slot::of(child, ctx) {
                Some(slot) => slots.push(slot),
                None => {
                    return Err(checks.fail(format!(
                        "The {} element cannot contain a {} element.",
                        node.name(),
                        child.name()
                    )));
                }
            }
        }
        Self::check_cardinality(&checks, &slots)?;

        let header = Self::read_header(&checks, ctx)?;

        let components = node
            .children()
            .iter()
            .map(|child| {
                TopLevel::from_node(child, ctx).map_err(|e| e.located_under(&parent))
            })
            .collect::<Result<Vec<_>>>()?;

        let security = SecurityAttributes::from_node(&checks, ctx)?;
        if ctx.version().is_at_least(HEADER_SINCE) {
            security.require_marking(checks.locator())?;
        }

        let mut warnings = Vec::new();
        for component in &components {
            adopt_warnings(&mut warnings, &parent, component.warnings());
        }
        tracing::debug!(
            version = %ctx.version(),
            components = components.len(),
            warnings = warnings.len(),
            "Resource validated"
        );

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            components,
            header,
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

/// Editable form of a [`Resource`].
///
/// Committing emits components in the usual document order: identifiers,
/// titles, subtitles, description, languages, dates, producers, subject and
/// geospatial coverage, processing information, then security.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBuilder {
    pub identifiers: BuilderList<IdentifierBuilder>,
    pub titles: BuilderList<TextComponentBuilder>,
    pub subtitles: BuilderList<TextComponentBuilder>,
    pub description: TextComponentBuilder,
    pub languages: BuilderList<LanguageBuilder>,
    pub dates: DatesBuilder,
    pub producers: BuilderList<ProducerRoleBuilder>,
    pub subject_coverages: BuilderList<SubjectCoverageBuilder>,
    pub geospatial_coverages: BuilderList<GeospatialCoverageBuilder>,
    pub processing_infos: BuilderList<TextComponentBuilder>,
    pub security: SecurityBuilder,
    pub resource_element: String,
    pub create_date: String,
    pub des_version: String,
    pub resource_security: SecurityAttributesBuilder,
}

impl Default for ResourceBuilder {
    fn default() -> Self {
        Self {
            identifiers: BuilderList::default(),
            titles: BuilderList::new(TextComponentBuilder::new(&leaf::TITLE)),
            subtitles: BuilderList::new(TextComponentBuilder::new(&leaf::SUBTITLE)),
            description: TextComponentBuilder::new(&leaf::DESCRIPTION),
            languages: BuilderList::default(),
            dates: DatesBuilder::default(),
            producers: BuilderList::new(ProducerRoleBuilder::new(ProducerKind::Creator)),
            subject_coverages: BuilderList::default(),
            geospatial_coverages: BuilderList::default(),
            processing_infos: BuilderList::new(TextComponentBuilder::new(&leaf::PROCESSING_INFO)),
            security: SecurityBuilder::default(),
            resource_element: String::new(),
            create_date: String::new(),
            des_version: String::new(),
            resource_security: SecurityAttributesBuilder::default(),
        }
    }
}

impl From<&Resource> for ResourceBuilder {
    fn from(resource: &Resource) -> Self {
        let mut builder = Self::default();
        for component in &resource.components {
            match component {
                TopLevel::Identifier(c) => builder.identifiers.push(c.into()),
                TopLevel::Text(c) => {
                    let def = c.def();
                    if std::ptr::eq(def, &leaf::TITLE) {
                        builder.titles.push(c.into());
                    } else if std::ptr::eq(def, &leaf::SUBTITLE) {
                        builder.subtitles.push(c.into());
                    } else if std::ptr::eq(def, &leaf::DESCRIPTION) {
                        builder.description = c.into();
                    } else {
                        builder.processing_infos.push(c.into());
                    }
                }
                TopLevel::Language(c) => builder.languages.push(c.into()),
                TopLevel::Dates(c) => builder.dates = c.into(),
                TopLevel::Producer(c) => builder.producers.push(c.into()),
                TopLevel::SubjectCoverage(c) => builder.subject_coverages.push(c.into()),
                TopLevel::GeospatialCoverage(c) => builder.geospatial_coverages.push(c.into()),
                TopLevel::Security(c) => builder.security = c.into(),
            }
        }
        if let Some(header) = &resource.header {
            builder.resource_element = header.resource_element.to_string();
            builder.create_date = header.create_date.clone();
            builder.des_version = header.des_version.to_string();
        }
        builder.resource_security = SecurityAttributesBuilder::from(&resource.security);
        builder
    }
}

impl ResourceBuilder {
    fn header_is_empty(&self) -> bool {
        builder::is_blank(&self.resource_element)
            && builder::is_blank(&self.create_date)
            && builder::is_blank(&self.des_version)
    }

    fn header(&self, ctx: &RecordContext) -> Result<Option<ResourceHeader>> {
        if self.header_is_empty() {
            return Ok(None);
        }
        let locator = format!("/{}", RESOURCE.qname(ctx)?);
        let resource_element = match builder::non_blank(&self.resource_element) {
            Some(value) => validation::check_boolean(value, RESOURCE_ELEMENT, &locator)?,
            None => true,
        };
        let des_version = validation::check_positive_integer(&self.des_version, DES_VERSION, &locator)?;
        Ok(Some(ResourceHeader {
            resource_element,
            create_date: self.create_date.trim().to_string(),
            des_version,
        }))
    }

    fn commit_components(&self, ctx: &RecordContext) -> Result<Vec<TopLevel>> {
        let mut components: Vec<TopLevel> = Vec::new();
        components.extend(self.identifiers.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.titles.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.subtitles.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.description.commit(ctx)?.map(TopLevel::from));
        components.extend(self.languages.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.dates.commit(ctx)?.map(TopLevel::from));
        components.extend(self.producers.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.subject_coverages.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.geospatial_coverages.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.processing_infos.commit_all(ctx)?.into_iter().map(TopLevel::from));
        components.extend(self.security.commit(ctx)?.map(TopLevel::from));
        Ok(components)
    }
}

impl Builder for ResourceBuilder {
    type Target = Resource;

    fn is_empty(&self) -> bool {
        self.identifiers.all_empty()
            && self.titles.all_empty()
            && self.subtitles.all_empty()
            && self.description.is_empty()
            && self.languages.all_empty()
            && self.dates.is_empty()
            && self.producers.all_empty()
            && self.subject_coverages.all_empty()
            && self.geospatial_coverages.all_empty()
            && self.processing_infos.all_empty()
            && self.security.is_empty()
            && self.header_is_empty()
            && self.resource_security.is_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Resource>> {
        if self.is_empty() {
            return Ok(None);
        }
        let components = self.commit_components(ctx)?;
        let header = self.header(ctx)?;
        Resource::new(
            &components,
            header.as_ref(),
            &self.resource_security.to_attributes(),
            ctx,
        )
        .map(Some)
    }
}
