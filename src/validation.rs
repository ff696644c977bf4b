//! Validation engine
//!
//! Messages, locators and the reusable rule checks shared by every component:
//! cardinality, formats (dates, URIs, NCNames, NMTOKENs, numeric bounds) and
//! controlled-vocabulary membership. Structural failures are returned as
//! [`DdmsError::Invalid`]; advisory findings are plain [`ValidationMessage`]s.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::context::RecordContext;
use crate::error::{DdmsError, Result};
use crate::node::ComponentNode;

static NCNAME_REGEX: OnceLock<Regex> = OnceLock::new();
static NMTOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
static TIMEZONE_REGEX: OnceLock<Regex> = OnceLock::new();
static URI_BASE: OnceLock<Url> = OnceLock::new();

// XML name characters by Unicode category: letters start a name, digits,
// combining marks and the middle dot may follow
fn ncname_regex() -> &'static Regex {
    NCNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{Nl}_][\p{L}\p{Nl}\p{Nd}\p{Mn}\p{Mc}\x{B7}_.\-]*$")
            .expect("Failed to compile NCName regex")
    })
}

fn nmtoken_regex() -> &'static Regex {
    NMTOKEN_REGEX.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{Nl}\p{Nd}\p{Mn}\p{Mc}\x{B7}_.:\-]+$")
            .expect("Failed to compile NMTOKEN regex")
    })
}

fn timezone_regex() -> &'static Regex {
    TIMEZONE_REGEX.get_or_init(|| {
        Regex::new(r"(Z|[+\-]\d{2}:\d{2})$").expect("Failed to compile timezone regex")
    })
}

fn uri_base() -> &'static Url {
    URI_BASE.get_or_init(|| Url::parse("http://localhost/").expect("Failed to parse URI base"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Error,
    Warning,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Error => f.write_str("Error"),
            MessageKind::Warning => f.write_str("Warning"),
        }
    }
}

/// A located validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    kind: MessageKind,
    text: String,
    locator: String,
}

impl ValidationMessage {
    pub fn error(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
            locator: locator.into(),
        }
    }

    pub fn warning(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            text: text.into(),
            locator: locator.into(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// A copy of this message as seen from an ancestor
    pub fn under(&self, ancestor: &str) -> Self {
        self.clone().into_under(ancestor)
    }

    pub fn into_under(mut self, ancestor: &str) -> Self {
        self.locator = format!("/{}{}", ancestor, self.locator);
        self
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.locator, self.text)
    }
}

/// Locator of a node on its own, before any ancestor has prefixed it
pub fn locator_for(node: &ComponentNode) -> String {
    format!("/{}", node.name().qualified())
}

/// Copy a child's warnings into a parent aggregate, prefixed with the parent's name
pub fn adopt_warnings(
    into: &mut Vec<ValidationMessage>,
    parent: &str,
    child_warnings: &[ValidationMessage],
) {
    into.extend(child_warnings.iter().map(|warning| warning.under(parent)));
}

/// Rule checks against one node, all reporting at the node's locator
#[derive(Debug)]
pub struct NodeChecks<'a> {
    node: &'a ComponentNode,
    locator: String,
}

impl<'a> NodeChecks<'a> {
    pub fn new(node: &'a ComponentNode) -> Self {
        Self {
            node,
            locator: locator_for(node),
        }
    }

    pub fn node(&self) -> &'a ComponentNode {
        self.node
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn fail(&self, text: impl Into<String>) -> DdmsError {
        DdmsError::invalid(text, self.locator.clone())
    }

    pub fn warn(&self, text: impl Into<String>) -> ValidationMessage {
        ValidationMessage::warning(text, self.locator.clone())
    }

    pub fn expect_name(&self, namespace: &str, local: &str) -> Result<()> {
        if self.node.name().matches(namespace, local) {
            Ok(())
        } else {
            Err(self.fail(format!(
                "Unexpected namespace URI and local name encountered: {} ({}), expected {}",
                self.node.name(),
                self.node.name().namespace(),
                local
            )))
        }
    }

    /// Attribute value, or `None` when missing or blank
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&'a str> {
        self.node
            .attribute(namespace, local)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn required_attribute(&self, namespace: &str, local: &str) -> Result<&'a str> {
        self.attribute(namespace, local)
            .ok_or_else(|| self.fail(format!("The {} attribute is required.", local)))
    }

    pub fn required_text(&self) -> Result<&'a str> {
        match self.node.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(self.fail(format!("The {} element requires child text.", self.node.name()))),
        }
    }

    pub fn children(&self, namespace: &'a str, local: &'a str) -> Vec<&'a ComponentNode> {
        self.node.children_named(namespace, local).collect()
    }

    pub fn at_least(&self, count: usize, min: usize, what: &str) -> Result<()> {
        if count >= min {
            return Ok(());
        }
        if min == 1 {
            Err(self.fail(format!("At least one {} must exist.", what)))
        } else {
            Err(self.fail(format!("At least {} {} must exist.", min, what)))
        }
    }

    pub fn at_most(&self, count: usize, max: usize, what: &str) -> Result<()> {
        if count <= max {
            Ok(())
        } else {
            Err(self.fail(format!("No more than {} {} can exist.", max, what)))
        }
    }

    pub fn exactly(&self, count: usize, expected: usize, what: &str) -> Result<()> {
        if count == expected {
            Ok(())
        } else {
            Err(self.fail(format!("Exactly {} {} must exist.", expected, what)))
        }
    }

    /// Fails when any element child outside `allowed` (namespace, local) is present
    pub fn only_children(&self, allowed: &[(&str, &str)]) -> Result<()> {
        match self.node.children().iter().find(|child| {
            !allowed
                .iter()
                .any(|(namespace, local)| child.name().matches(namespace, local))
        }) {
            Some(child) => Err(self.fail(format!(
                "The {} element cannot contain a {} element.",
                self.node.name(),
                child.name()
            ))),
            None => Ok(()),
        }
    }
}

/// Which members of the xs:date family a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// xs:date or xs:dateTime
    Full,
    /// xs:date, xs:dateTime, xs:gYearMonth or xs:gYear
    Flexible,
}

fn strip_timezone(value: &str) -> &str {
    match timezone_regex().find(value) {
        Some(found) if found.start() >= 4 => &value[..found.start()],
        _ => value,
    }
}

fn is_full_date(value: &str) -> bool {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    let local = strip_timezone(value);
    NaiveDate::parse_from_str(local, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S").is_ok()
}

fn is_year_month(value: &str) -> bool {
    let local = strip_timezone(value);
    local.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", local), "%Y-%m-%d").is_ok()
}

fn is_year(value: &str) -> bool {
    let local = strip_timezone(value);
    local.len() == 4 && local.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_date(value: &str, rule: DateRule) -> bool {
    let value = value.trim();
    match rule {
        DateRule::Full => is_full_date(value),
        DateRule::Flexible => is_full_date(value) || is_year_month(value) || is_year(value),
    }
}

pub fn check_date(value: &str, rule: DateRule, label: &str, locator: &str) -> Result<()> {
    if is_valid_date(value, rule) {
        Ok(())
    } else {
        Err(DdmsError::invalid(
            format!("The {} attribute is not in a valid date format: {}", label, value),
            locator,
        ))
    }
}

pub fn is_valid_uri(value: &str) -> bool {
    if value.trim().is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    match Url::parse(value) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => uri_base().join(value).is_ok(),
        Err(_) => false,
    }
}

pub fn check_uri(value: &str, label: &str, locator: &str) -> Result<()> {
    if is_valid_uri(value) {
        Ok(())
    } else {
        Err(DdmsError::invalid(
            format!("Invalid URI for the {} attribute: {}", label, value),
            locator,
        ))
    }
}

pub fn is_ncname(value: &str) -> bool {
    ncname_regex().is_match(value)
}

pub fn check_ncname(value: &str, label: &str, locator: &str) -> Result<()> {
    if is_ncname(value) {
        Ok(())
    } else {
        Err(DdmsError::invalid(
            format!("\"{}\" is not a valid NCName for the {} attribute.", value, label),
            locator,
        ))
    }
}

pub fn is_nmtoken(value: &str) -> bool {
    nmtoken_regex().is_match(value)
}

pub fn check_nmtokens(values: &[String], label: &str, locator: &str) -> Result<()> {
    match values.iter().find(|value| !is_nmtoken(value)) {
        Some(bad) => Err(DdmsError::invalid(
            format!("\"{}\" is not a valid NMTOKEN for the {} attribute.", bad, label),
            locator,
        )),
        None => Ok(()),
    }
}

/// Parse a decimal and check it falls within `[min, max]`
pub fn check_bounded(value: &str, min: f64, max: f64, label: &str, locator: &str) -> Result<f64> {
    let parsed: f64 = value.trim().parse().map_err(|_| {
        DdmsError::invalid(format!("The {} value must be a number: {}", label, value), locator)
    })?;
    if !(min..=max).contains(&parsed) {
        return Err(DdmsError::invalid(
            format!(
                "The {} value must be between {} and {}: {}",
                label, min, max, value
            ),
            locator,
        ));
    }
    Ok(parsed)
}

pub fn check_positive_integer(value: &str, label: &str, locator: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(DdmsError::invalid(
            format!("The {} attribute must be a positive integer: {}", label, value),
            locator,
        )),
    }
}

pub fn check_boolean(value: &str, label: &str, locator: &str) -> Result<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DdmsError::invalid(
            format!("The {} attribute must be a boolean: {}", label, value),
            locator,
        )),
    }
}

/// Check a value against a controlled vocabulary under the context's version.
///
/// A vocabulary that cannot be loaded is reported as a structural error.
pub fn check_vocabulary(
    ctx: &RecordContext,
    key: &str,
    value: &str,
    label: &str,
    locator: &str,
) -> Result<()> {
    match ctx.vocabulary().contains(ctx.version(), key, value) {
        Ok(true) => Ok(()),
        Ok(false) => Err(DdmsError::invalid(
            format!(
                "{} is not a valid enumeration token for the {} attribute, as specified in {}.",
                value, label, key
            ),
            locator,
        )),
        Err(err) => Err(DdmsError::invalid(
            format!("No controlled vocabulary could be found for {}: {}", key, err),
            locator,
        )),
    }
}
