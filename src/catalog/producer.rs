//! Producers: people, organizations and the roles they fill
//!
//! A [`ProducerRole`] wraps exactly one [`ProducerEntity`]. The role slot
//! (creator, publisher, ...) is always chosen by the caller, either
//! explicitly or from the element name when parsing.

use std::fmt;

use super::{child_texts, owned, text_children};
use crate::builder::{self, Builder};
use crate::component::{Component, ElementDef, check_attribute_since};
use crate::context::RecordContext;
use crate::error::{DdmsError, Result};
use crate::node::ComponentNode;
use crate::security::{SecurityAttributes, SecurityAttributesBuilder};
use crate::validation::{self, NodeChecks, ValidationMessage, adopt_warnings};
use crate::version::{SchemaVersion, Space};

const PERSON: ElementDef = ElementDef::new(Space::Ddms, "Person").renamed(SchemaVersion::V4_0_1, "person");
const ORGANIZATION: ElementDef =
    ElementDef::new(Space::Ddms, "Organization").renamed(SchemaVersion::V4_0_1, "organization");

const NAME: &str = "name";
const SURNAME: &str = "surname";
const USER_ID: &str = "userID";
const AFFILIATION: &str = "affiliation";
const PHONE: &str = "phone";
const EMAIL: &str = "email";
const ACRONYM: &str = "acronym";

/// A person who produced the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    node: ComponentNode,
    version: SchemaVersion,
    names: Vec<String>,
    surname: String,
    user_id: Option<String>,
    affiliations: Vec<String>,
    phones: Vec<String>,
    emails: Vec<String>,
}

impl Person {
    pub fn new(
        names: &[&str],
        surname: &str,
        user_id: Option<&str>,
        affiliations: &[&str],
        phones: &[&str],
        emails: &[&str],
        ctx: &RecordContext,
    ) -> Result<Self> {
        let ddms = Space::Ddms;
        let node = PERSON
            .new_node(ctx)?
            .with_children(text_children(ctx, ddms, NAME, &owned(names))?)
            .with_children(text_children(ctx, ddms, SURNAME, &owned(&[surname]))?)
            .with_children(text_children(ctx, ddms, USER_ID, &owned(&user_id.into_iter().collect::<Vec<_>>()))?)
            .with_children(text_children(ctx, ddms, AFFILIATION, &owned(affiliations))?)
            .with_children(text_children(ctx, ddms, PHONE, &owned(phones))?)
            .with_children(text_children(ctx, ddms, EMAIL, &owned(emails))?);
        Self::from_node(&node, ctx)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn affiliations(&self) -> &[String] {
        &self.affiliations
    }

    pub fn phones(&self) -> &[String] {
        &self.phones
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }
}

impl Component for Person {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = PERSON.open(node, ctx)?;
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        checks.only_children(&[
            (ddms, NAME),
            (ddms, SURNAME),
            (ddms, USER_ID),
            (ddms, AFFILIATION),
            (ddms, PHONE),
            (ddms, EMAIL),
        ])?;

        let names = child_texts(&checks, ddms, NAME);
        checks.at_least(names.len(), 1, NAME)?;
        checks.exactly(checks.children(ddms, SURNAME).len(), 1, SURNAME)?;
        checks.at_most(checks.children(ddms, USER_ID).len(), 1, USER_ID)?;

        let surname = child_texts(&checks, ddms, SURNAME)
            .into_iter()
            .next()
            .ok_or_else(|| checks.fail("The surname element requires child text."))?;

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            names,
            surname,
            user_id: child_texts(&checks, ddms, USER_ID).into_iter().next(),
            affiliations: child_texts(&checks, ddms, AFFILIATION),
            phones: child_texts(&checks, ddms, PHONE),
            emails: child_texts(&checks, ddms, EMAIL),
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
pub struct PersonBuilder {
    pub names: Vec<String>,
    pub surname: String,
    pub user_id: String,
    pub affiliations: Vec<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
}

impl From<&Person> for PersonBuilder {
    fn from(person: &Person) -> Self {
        Self {
            names: person.names.clone(),
            surname: person.surname.clone(),
            user_id: person.user_id.clone().unwrap_or_default(),
            affiliations: person.affiliations.clone(),
            phones: person.phones.clone(),
            emails: person.emails.clone(),
        }
    }
}

fn all_blank(values: &[String]) -> bool {
    values.iter().all(|value| builder::is_blank(value))
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

impl Builder for PersonBuilder {
    type Target = Person;

    fn is_empty(&self) -> bool {
        all_blank(&self.names)
            && builder::is_blank(&self.surname)
            && builder::is_blank(&self.user_id)
            && all_blank(&self.affiliations)
            && all_blank(&self.phones)
            && all_blank(&self.emails)
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Person>> {
        if self.is_empty() {
            return Ok(None);
        }
        Person::new(
            &as_strs(&self.names),
            &self.surname,
            builder::non_blank(&self.user_id),
            &as_strs(&self.affiliations),
            &as_strs(&self.phones),
            &as_strs(&self.emails),
            ctx,
        )
        .map(Some)
    }
}

/// An organization that produced the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    node: ComponentNode,
    version: SchemaVersion,
    names: Vec<String>,
    phones: Vec<String>,
    emails: Vec<String>,
    acronym: Option<String>,
}

impl Organization {
    pub fn new(
        names: &[&str],
        phones: &[&str],
        emails: &[&str],
        acronym: Option<&str>,
        ctx: &RecordContext,
    ) -> Result<Self> {
        let ddms = Space::Ddms;
        let mut node = ORGANIZATION.new_node(ctx)?;
        if let Some(acronym) = acronym {
            node = node.with_optional_attribute(ctx.qname(ddms, ACRONYM)?, Some(acronym));
        }
        let node = node
            .with_children(text_children(ctx, ddms, NAME, &owned(names))?)
            .with_children(text_children(ctx, ddms, PHONE, &owned(phones))?)
            .with_children(text_children(ctx, ddms, EMAIL, &owned(emails))?);
        Self::from_node(&node, ctx)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn phones(&self) -> &[String] {
        &self.phones
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn acronym(&self) -> Option<&str> {
        self.acronym.as_deref()
    }
}

impl Component for Organization {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = ORGANIZATION.open(node, ctx)?;
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        check_attribute_since(&checks, ddms, ACRONYM, SchemaVersion::V4_0_1, ctx.version())?;
        checks.only_children(&[(ddms, NAME), (ddms, PHONE), (ddms, EMAIL)])?;

        let names = child_texts(&checks, ddms, NAME);
        checks.at_least(names.len(), 1, NAME)?;

        Ok(Self {
            node: node.clone(),
            version: ctx.version(),
            names,
            phones: child_texts(&checks, ddms, PHONE),
            emails: child_texts(&checks, ddms, EMAIL),
            acronym: checks.attribute(ddms, ACRONYM).map(str::to_string),
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
pub struct OrganizationBuilder {
    pub names: Vec<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub acronym: String,
}

impl From<&Organization> for OrganizationBuilder {
    fn from(organization: &Organization) -> Self {
        Self {
            names: organization.names.clone(),
            phones: organization.phones.clone(),
            emails: organization.emails.clone(),
            acronym: organization.acronym.clone().unwrap_or_default(),
        }
    }
}

impl Builder for OrganizationBuilder {
    type Target = Organization;

    fn is_empty(&self) -> bool {
        all_blank(&self.names)
            && all_blank(&self.phones)
            && all_blank(&self.emails)
            && builder::is_blank(&self.acronym)
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<Organization>> {
        if self.is_empty() {
            return Ok(None);
        }
        Organization::new(
            &as_strs(&self.names),
            &as_strs(&self.phones),
            &as_strs(&self.emails),
            builder::non_blank(&self.acronym),
            ctx,
        )
        .map(Some)
    }
}

/// The entity filling a producer role
#[derive(Debug, Clone, PartialEq)]
pub enum ProducerEntity {
    Person(Person),
    Organization(Organization),
}

impl ProducerEntity {
    /// Interpret a node as whichever entity its name selects
    pub fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let (namespace, local) = ORGANIZATION.expected(ctx);
        if node.name().matches(namespace, local) {
            Organization::from_node(node, ctx).map(ProducerEntity::Organization)
        } else {
            Person::from_node(node, ctx).map(ProducerEntity::Person)
        }
    }

    pub fn node(&self) -> &ComponentNode {
        match self {
            ProducerEntity::Person(person) => person.node(),
            ProducerEntity::Organization(organization) => organization.node(),
        }
    }

    pub fn warnings(&self) -> &[ValidationMessage] {
        match self {
            ProducerEntity::Person(person) => person.warnings(),
            ProducerEntity::Organization(organization) => organization.warnings(),
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            ProducerEntity::Person(person) => person.names(),
            ProducerEntity::Organization(organization) => organization.names(),
        }
    }
}

impl From<Person> for ProducerEntity {
    fn from(person: Person) -> Self {
        ProducerEntity::Person(person)
    }
}

impl From<Organization> for ProducerEntity {
    fn from(organization: Organization) -> Self {
        ProducerEntity::Organization(organization)
    }
}

/// The role slot a producer fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerKind {
    Creator,
    Publisher,
    Contributor,
    PointOfContact,
}

impl ProducerKind {
    pub const ALL: [ProducerKind; 4] = [
        ProducerKind::Creator,
        ProducerKind::Publisher,
        ProducerKind::Contributor,
        ProducerKind::PointOfContact,
    ];

    pub fn element_name(self) -> &'static str {
        match self {
            ProducerKind::Creator => "creator",
            ProducerKind::Publisher => "publisher",
            ProducerKind::Contributor => "contributor",
            ProducerKind::PointOfContact => "pointOfContact",
        }
    }

    fn def(self) -> ElementDef {
        ElementDef::new(Space::Ddms, self.element_name())
    }

    /// The kind whose element name matches the node under the context
    pub fn for_node(node: &ComponentNode, ctx: &RecordContext) -> Option<ProducerKind> {
        let ddms = ctx.namespace_or_empty(Space::Ddms);
        Self::ALL
            .into_iter()
            .find(|kind| node.name().matches(ddms, kind.element_name()))
    }
}

impl fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// A creator, publisher, contributor or point of contact
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerRole {
    kind: ProducerKind,
    node: ComponentNode,
    version: SchemaVersion,
    entity: ProducerEntity,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl ProducerRole {
    pub fn new(
        kind: ProducerKind,
        entity: impl Into<ProducerEntity>,
        security: &SecurityAttributes,
        ctx: &RecordContext,
    ) -> Result<Self> {
        let entity = entity.into();
        let node = kind.def().new_node(ctx)?.with_child(entity.node().clone());
        let node = security.apply(node, ctx)?;
        Self::parse_as(kind, &node, ctx)
    }

    /// Interpret a node as a specific role
    pub fn parse_as(kind: ProducerKind, node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        let checks = kind.def().open(node, ctx)?;
        checks.exactly(node.children().len(), 1, "producer entity")?;

        let parent = node.name().qualified();
        let entity = ProducerEntity::from_node(&node.children()[0], ctx)
            .map_err(|e| e.located_under(&parent))?;
        let security = SecurityAttributes::from_node(&checks, ctx)?;

        Ok(Self {
            kind,
            node: node.clone(),
            version: ctx.version(),
            warnings: Self::advisories(&checks, &entity),
            entity,
            security,
        })
    }

    fn advisories(checks: &NodeChecks<'_>, entity: &ProducerEntity) -> Vec<ValidationMessage> {
        let mut warnings = Vec::new();
        adopt_warnings(&mut warnings, &checks.node().name().qualified(), entity.warnings());
        warnings
    }

    pub fn kind(&self) -> ProducerKind {
        self.kind
    }

    pub fn entity(&self) -> &ProducerEntity {
        &self.entity
    }

    pub fn security_attributes(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for ProducerRole {
    fn from_node(node: &ComponentNode, ctx: &RecordContext) -> Result<Self> {
        match ProducerKind::for_node(node, ctx) {
            Some(kind) => Self::parse_as(kind, node, ctx),
            None => Err(NodeChecks::new(node).fail(format!(
                "Unexpected namespace URI and local name encountered: {} ({})",
                node.name(),
                node.name().namespace()
            ))),
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

/// Which entity builder a role builder commits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntityKind {
    #[default]
    Person,
    Organization,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => f.write_str("person"),
            EntityKind::Organization => f.write_str("organization"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerRoleBuilder {
    pub kind: ProducerKind,
    pub entity_kind: EntityKind,
    pub person: PersonBuilder,
    pub organization: OrganizationBuilder,
    pub security: SecurityAttributesBuilder,
}

impl ProducerRoleBuilder {
    pub fn new(kind: ProducerKind) -> Self {
        Self {
            kind,
            entity_kind: EntityKind::default(),
            person: PersonBuilder::default(),
            organization: OrganizationBuilder::default(),
            security: SecurityAttributesBuilder::default(),
        }
    }

    fn selected_is_empty(&self) -> bool {
        match self.entity_kind {
            EntityKind::Person => self.person.is_empty(),
            EntityKind::Organization => self.organization.is_empty(),
        }
    }
}

impl From<&ProducerRole> for ProducerRoleBuilder {
    fn from(role: &ProducerRole) -> Self {
        let mut builder = Self::new(role.kind);
        builder.security = SecurityAttributesBuilder::from(&role.security);
        match &role.entity {
            ProducerEntity::Person(person) => {
                builder.entity_kind = EntityKind::Person;
                builder.person = PersonBuilder::from(person);
            }
            ProducerEntity::Organization(organization) => {
                builder.entity_kind = EntityKind::Organization;
                builder.organization = OrganizationBuilder::from(organization);
            }
        }
        builder
    }
}

impl Builder for ProducerRoleBuilder {
    type Target = ProducerRole;

    fn is_empty(&self) -> bool {
        self.person.is_empty() && self.organization.is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &RecordContext) -> Result<Option<ProducerRole>> {
        if self.is_empty() {
            return Ok(None);
        }
        if self.selected_is_empty() && !(self.person.is_empty() && self.organization.is_empty()) {
            let locator = validation::locator_for(&self.kind.def().new_node(ctx)?);
            return Err(DdmsError::invalid(
                format!(
                    "The selected {} entity is empty but the other entity has values.",
                    self.entity_kind
                ),
                locator,
            ));
        }
        let entity: ProducerEntity = match self.entity_kind {
            EntityKind::Person => Person::new(
                &as_strs(&self.person.names),
                &self.person.surname,
                builder::non_blank(&self.person.user_id),
                &as_strs(&self.person.affiliations),
                &as_strs(&self.person.phones),
                &as_strs(&self.person.emails),
                ctx,
            )?
            .into(),
            EntityKind::Organization => Organization::new(
                &as_strs(&self.organization.names),
                &as_strs(&self.organization.phones),
                &as_strs(&self.organization.emails),
                builder::non_blank(&self.organization.acronym),
                ctx,
            )?
            .into(),
        };
        ProducerRole::new(self.kind, entity, &self.security.to_attributes(), ctx).map(Some)
    }
}
