//! Concrete record components
//!
//! Composite elements built on the generic lifecycle in
//! [`crate::component`]. Leaf text elements live in [`crate::leaf`].

pub mod geospatial;
pub mod producer;
pub mod subject;
pub mod summary;

use crate::context::RecordContext;
use crate::error::Result;
use crate::node::ComponentNode;
use crate::validation::NodeChecks;
use crate::version::Space;

/// A child element holding only text
pub(crate) fn text_child(
    ctx: &RecordContext,
    space: Space,
    local: &str,
    value: &str,
) -> Result<ComponentNode> {
    Ok(ComponentNode::new(ctx.qname(space, local)?).with_text(value))
}

/// One text child per non-blank value
pub(crate) fn text_children(
    ctx: &RecordContext,
    space: Space,
    local: &str,
    values: &[String],
) -> Result<Vec<ComponentNode>> {
    values
        .iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| text_child(ctx, space, local, value))
        .collect()
}

/// Trimmed, non-blank text of every child with the given name
pub(crate) fn child_texts(checks: &NodeChecks<'_>, namespace: &'static str, local: &'static str) -> Vec<String> {
    checks
        .children(namespace, local)
        .into_iter()
        .map(|child| child.text_or_empty().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Owned copies of the non-blank entries
pub(crate) fn owned(values: &[&str]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
