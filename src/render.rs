//! Renderers
//!
//! `to_xml` writes the canonical XML form of a node: namespace declarations
//! on the root in first-use order, then attributes and children exactly in the
//! order they were captured. `to_html` and `to_text` flatten the tree into
//! dotted-path key/value lines for human-readable, diffable summaries.

use std::borrow::Cow;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName as XmlName;

use crate::error::{DdmsError, Result};
use crate::node::ComponentNode;

/// Canonical XML for a node tree, without an XML declaration or indentation
pub fn to_xml(node: &ComponentNode) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    let declarations = node.namespace_declarations()?;
    write_node(&mut writer, node, &declarations)?;
    String::from_utf8(writer.into_inner()).map_err(|e| DdmsError::Render(e.to_string()))
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    node: &ComponentNode,
    declarations: &[(String, String)],
) -> Result<()> {
    let qualified = node.name().qualified();
    let mut start = BytesStart::new(qualified.clone());

    for (prefix, uri) in declarations {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        start.push_attribute((key.as_str(), uri.as_str()));
    }
    for attr in node.attributes() {
        let key = attr.name().qualified();
        start.push_attribute(Attribute {
            key: XmlName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(attr.value()).into_bytes()),
        });
    }

    if node.children().is_empty() && node.text().is_none() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if let Some(text) = node.text() {
        emit(writer, Event::Text(BytesText::from_escaped(escape_text(text))))?;
    }
    for child in node.children() {
        write_node(writer, child, &[])?;
    }
    emit(writer, Event::End(BytesEnd::new(qualified)))
}

/// Attribute values also escape whitespace that a parser would normalize to spaces
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
        .replace('\r', "&#13;")
}

/// Text keeps newlines and tabs, but a parser normalizes carriage returns away
fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#13;")
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| DdmsError::Render(e.to_string()))
}

/// Dotted-path key/value pairs for a tree, omitting empty values.
///
/// Attributes follow their element (`title.classification`), text is keyed
/// by the element path itself, and children follow in captured order.
pub fn flatten(node: &ComponentNode) -> Vec<(String, String)> {
    let mut lines = Vec::new();
    flatten_into(node, "", &mut lines);
    lines
}

fn flatten_into(node: &ComponentNode, parent: &str, lines: &mut Vec<(String, String)>) {
    let path = if parent.is_empty() {
        node.name().local().to_string()
    } else {
        format!("{}.{}", parent, node.name().local())
    };

    for attr in node.attributes() {
        let value = attr.value().trim();
        if !value.is_empty() {
            lines.push((format!("{}.{}", path, attr.name().local()), value.to_string()));
        }
    }
    if let Some(text) = node.text() {
        let text = text.trim();
        if !text.is_empty() {
            lines.push((path.clone(), text.to_string()));
        }
    }
    for child in node.children() {
        flatten_into(child, &path, lines);
    }
}

/// One `<meta>` line per flattened value
pub fn to_html(node: &ComponentNode) -> String {
    flatten(node)
        .into_iter()
        .map(|(key, value)| {
            format!(
                "<meta name=\"{}\" content=\"{}\" />\n",
                escape(key.as_str()),
                escape(value.as_str())
            )
        })
        .collect()
}

/// One `key = value` line per flattened value
pub fn to_text(node: &ComponentNode) -> String {
    flatten(node)
        .into_iter()
        .map(|(key, value)| format!("{} = {}\n", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::QName;

    const DDMS: &str = "urn:us:mil:ces:metadata:ddms:5";
    const ISM: &str = "urn:us:gov:ic:ism";

    fn sample() -> ComponentNode {
        ComponentNode::new(QName::new("ddms", "person", DDMS))
            .with_child(ComponentNode::new(QName::new("ddms", "name", DDMS)).with_text("Brian"))
            .with_child(ComponentNode::new(QName::new("ddms", "surname", DDMS)).with_text("Uri & Co"))
            .with_child(
                ComponentNode::new(QName::new("ddms", "phone", DDMS))
                    .with_attribute(QName::new("ism", "classification", ISM), "U"),
            )
    }

    #[test]
    fn test_to_xml_is_canonical() {
        let xml = to_xml(&sample()).unwrap();
        assert_eq!(
            xml,
            "<ddms:person xmlns:ddms=\"urn:us:mil:ces:metadata:ddms:5\" xmlns:ism=\"urn:us:gov:ic:ism\">\
             <ddms:name>Brian</ddms:name>\
             <ddms:surname>Uri &amp; Co</ddms:surname>\
             <ddms:phone ism:classification=\"U\"/>\
             </ddms:person>"
        );
    }

    #[test]
    fn test_to_xml_round_trips() {
        let node = sample();
        let reparsed = ComponentNode::parse(&to_xml(&node).unwrap()).unwrap();
        assert_eq!(reparsed, node);
    }

    #[test]
    fn test_to_xml_preserves_whitespace_in_values() {
        let node = ComponentNode::new(QName::new("ddms", "title", DDMS))
            .with_attribute(QName::new("ism", "notice", ISM), "line1\nline2\ttab\r")
            .with_text("a\r\nb\tc");
        let xml = to_xml(&node).unwrap();

        assert!(xml.contains("ism:notice=\"line1&#10;line2&#9;tab&#13;\""));
        assert!(xml.contains(">a&#13;\nb\tc</ddms:title>"));
        assert_eq!(ComponentNode::parse(&xml).unwrap(), node);
    }

    #[test]
    fn test_to_xml_rejects_conflicting_prefixes() {
        let node = ComponentNode::new(QName::new("ddms", "title", DDMS))
            .with_child(ComponentNode::new(QName::new("ddms", "name", "urn:example:other")));
        assert!(matches!(to_xml(&node), Err(DdmsError::Render(_))));
    }

    #[test]
    fn test_to_text_flattens_paths() {
        assert_eq!(
            to_text(&sample()),
            "person.name = Brian\nperson.surname = Uri & Co\nperson.phone.classification = U\n"
        );
    }

    #[test]
    fn test_to_html_escapes_values() {
        let html = to_html(&sample());
        assert!(html.contains("<meta name=\"person.surname\" content=\"Uri &amp; Co\" />"));
        assert_eq!(html.lines().count(), 3);
    }

    #[test]
    fn test_flatten_omits_empty_values() {
        let node = ComponentNode::new(QName::unqualified("dates"))
            .with_attribute(QName::unqualified("created"), "")
            .with_attribute(QName::unqualified("posted"), "2001-01-01");
        assert_eq!(
            flatten(&node),
            vec![("dates.posted".to_string(), "2001-01-01".to_string())]
        );
    }
}
