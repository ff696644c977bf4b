//! Mutable builders and the commit step
//!
//! A builder mirrors one component field for field. Builders are made empty
//! (to author new content) or from an existing component (to edit it), and
//! `commit` turns them back into validated components. An empty builder
//! commits to `None` without running any validation, which lets editors leave
//! optional sections untouched.

use crate::context::RecordContext;
use crate::error::Result;

pub trait Builder {
    type Target;

    /// True when every scalar field is blank and every nested builder is empty
    fn is_empty(&self) -> bool;

    /// `None` for an empty builder, else the validated component or the first structural error
    fn commit(&self, ctx: &RecordContext) -> Result<Option<Self::Target>>;
}

/// Blank or unset scalar builder fields
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `None` for blank strings, `Some(trimmed)` otherwise
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Split a space-separated list field into tokens
pub fn tokens(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Ordered list of child builders.
///
/// Growth is explicit: `ensure_len` pads the list with copies of the
/// template, and `get_or_default` grows it just far enough to address an
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderList<B: Clone> {
    items: Vec<B>,
    template: B,
}

impl<B: Clone + Default> Default for BuilderList<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: Clone> BuilderList<B> {
    pub fn new(template: B) -> Self {
        Self {
            items: Vec::new(),
            template,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pad with fresh builders until at least `len` entries exist
    pub fn ensure_len(&mut self, len: usize) {
        while self.items.len() < len {
            self.items.push(self.template.clone());
        }
    }

    /// The builder at `index`, growing the list to reach it
    pub fn get_or_default(&mut self, index: usize) -> &mut B {
        self.ensure_len(index + 1);
        &mut self.items[index]
    }

    pub fn get(&self, index: usize) -> Option<&B> {
        self.items.get(index)
    }

    pub fn push(&mut self, builder: B) {
        self.items.push(builder);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, B> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, B> {
        self.items.iter_mut()
    }
}

impl<B: Builder + Clone> BuilderList<B> {
    /// True when every entry is an empty builder
    pub fn all_empty(&self) -> bool {
        self.items.iter().all(Builder::is_empty)
    }

    /// Commit each entry in order, dropping the ones that commit to nothing
    pub fn commit_all(&self, ctx: &RecordContext) -> Result<Vec<B::Target>> {
        let mut committed = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if let Some(target) = item.commit(ctx)? {
                committed.push(target);
            }
        }
        Ok(committed)
    }
}

impl<B: Clone> FromIterator<B> for BuilderList<B>
where
    B: Default,
{
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        let mut list = Self::default();
        list.items.extend(iter);
        list
    }
}

impl<'a, B: Clone> IntoIterator for &'a BuilderList<B> {
    type Item = &'a B;
    type IntoIter = std::slice::Iter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
