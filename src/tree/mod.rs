//! Auto-vivifying configuration tree
//!
//! An [`AutoTree`] is a nested, insertion-ordered mapping that behaves like a
//! dynamic object graph:
//!
//! - reading a missing name creates an empty child tree (unless the tree is
//!   strict, in which case the read fails with `NotFound`)
//! - merges recurse field by field and never clobber unmentioned siblings
//! - snapshots are fully independent deep copies
//! - an optional key prefix namespaces attribute-style and merged keys
//!
//! ```
//! use plexiglass::tree::AutoTree;
//!
//! let mut tree = AutoTree::new();
//! tree.child("apple").unwrap().set_attr("x", 20);
//! assert_eq!(tree.to_text().unwrap(), r#"{"apple":{"x":20}}"#);
//! ```

mod merge;
mod node;
mod text;

use std::borrow::Cow;
use std::ops::{Index, IndexMut};

use indexmap::map::Entry;
use tracing::debug;

use crate::errors::{PlexiglassError, Result};

pub use merge::Source;
pub use node::{Entries, ForeignValue, Node};
pub use text::from_text;

/// Dynamic nested configuration container
#[derive(Debug, Clone)]
pub struct AutoTree {
    entries: Entries,
    auto_create: bool,
    key_prefix: String,
}

impl Default for AutoTree {
    fn default() -> Self {
        Self::with_auto_create(true)
    }
}

impl PartialEq for AutoTree {
    /// Trees are equal when their entries are; flags are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl AutoTree {
    /// Empty auto-creating tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tree that fails on missing names instead of creating them
    pub fn strict() -> Self {
        Self::with_auto_create(false)
    }

    pub fn with_auto_create(auto_create: bool) -> Self {
        Self {
            entries: Entries::new(),
            auto_create,
            key_prefix: String::new(),
        }
    }

    pub fn builder<'a>() -> AutoTreeBuilder<'a> {
        AutoTreeBuilder::default()
    }

    /// Auto-creating tree loaded from JSON object text
    pub fn from_text(text: &str) -> Result<Self> {
        let mut tree = Self::new();
        tree.merge(text)?;
        Ok(tree)
    }

    pub fn auto_create(&self) -> bool {
        self.auto_create
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Entries {
        &mut self.entries
    }

    // ========================================================================
    // Merge and snapshot
    // ========================================================================

    /// Deep-merge `source` into this tree and return it
    ///
    /// Text is parsed before anything is touched, so a parse error leaves the
    /// tree unchanged.
    pub fn merge<'a>(&mut self, source: impl Into<Source<'a>>) -> Result<&mut Self> {
        let source = source.into().normalize()?;
        debug!(keys = source.len(), prefix = %self.key_prefix, "merging into tree");
        merge::merge_entries(&source, &mut self.entries, self.auto_create, &self.key_prefix);
        Ok(self)
    }

    /// Independent deep copy with the same auto-create mode and no prefix
    pub fn snapshot(&self) -> AutoTree {
        let mut copy = AutoTree::with_auto_create(self.auto_create);
        merge::merge_entries(&self.entries, &mut copy.entries, copy.auto_create, "");
        copy
    }

    /// Independent deep copy with `overlay` merged on top
    pub fn snapshot_with<'a>(&self, overlay: impl Into<Source<'a>>) -> Result<AutoTree> {
        let overlay = overlay.into().normalize()?;
        let mut copy = self.snapshot();
        merge::merge_entries(&overlay, &mut copy.entries, copy.auto_create, "");
        Ok(copy)
    }

    // ========================================================================
    // Index-style access (keys used verbatim)
    // ========================================================================

    /// Look up a name without creating it
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    /// Look up a name, falling back to `default` without creating anything
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Node) -> &'a Node {
        self.entries.get(key).unwrap_or(default)
    }

    /// Look up a name, auto-vivifying an empty child tree on a miss
    ///
    /// Strict trees fail with `NotFound` instead.
    pub fn get_or_create(&mut self, key: &str) -> Result<&mut Node> {
        let auto_create = self.auto_create;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) if auto_create => Ok(entry.insert(Node::Tree(AutoTree::new()))),
            Entry::Vacant(entry) => Err(PlexiglassError::NotFound(entry.into_key())),
        }
    }

    /// Store a value under `key` as given
    ///
    /// Plain mappings become child trees unless this tree is strict.
    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let value = self.adopt(value.into());
        self.entries.insert(key.into(), value);
    }

    /// Remove and return the value under `key`
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key)
    }

    // ========================================================================
    // Attribute-style access (keys carry the instance prefix)
    // ========================================================================

    pub fn attr(&self, name: &str) -> Option<&Node> {
        self.entries.get(&*self.prefixed(name))
    }

    pub fn attr_mut(&mut self, name: &str) -> Result<&mut Node> {
        let key = self.prefixed(name).into_owned();
        self.get_or_create(&key)
    }

    /// Nested tree under `name`, auto-vivified when missing
    pub fn child(&mut self, name: &str) -> Result<&mut AutoTree> {
        let key = self.prefixed(name).into_owned();
        match self.get_or_create(&key)? {
            Node::Tree(tree) => Ok(tree),
            _ => Err(PlexiglassError::TypeMismatch {
                key,
                expected: "tree",
            }),
        }
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<Node>) {
        let key = self.prefixed(name).into_owned();
        self.set_item(key, value);
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<Node> {
        let key = self.prefixed(name).into_owned();
        self.remove(&key)
    }

    // ========================================================================
    // Mapping proxies
    // ========================================================================

    /// Membership check; never auto-creates
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    fn prefixed<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.key_prefix.is_empty() {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(format!("{}{}", self.key_prefix, name))
        }
    }

    fn adopt(&self, value: Node) -> Node {
        match value {
            Node::Map(fields) if self.auto_create => {
                let mut child = AutoTree::new();
                merge::merge_entries(&fields, &mut child.entries, true, "");
                Node::Tree(child)
            }
            other => other,
        }
    }
}

impl<'a> IntoIterator for &'a AutoTree {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Index<&str> for AutoTree {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if `key` is missing. Use [`AutoTree::get`] for a fallible lookup.
    fn index(&self, key: &str) -> &Node {
        match self.entries.get(key) {
            Some(node) => node,
            None => panic!("no entry found for key '{}'", key),
        }
    }
}

impl IndexMut<&str> for AutoTree {
    /// # Panics
    ///
    /// Panics on a miss in a strict tree. Use [`AutoTree::get_or_create`]
    /// to handle that case.
    ///
    /// On an auto-creating tree a plain mapping stored by assignment is
    /// turned into a child tree here, so chained writes keep vivifying.
    fn index_mut(&mut self, key: &str) -> &mut Node {
        if self.auto_create {
            if let Some(node) = self.entries.get_mut(key) {
                if let Node::Map(fields) = node {
                    let mut child = AutoTree::new();
                    merge::merge_entries(fields, &mut child.entries, true, "");
                    *node = Node::Tree(child);
                }
            }
        }
        match self.get_or_create(key) {
            Ok(node) => node,
            Err(e) => panic!("{}", e),
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for trees with a prefix, a mode or initial data
#[derive(Debug)]
pub struct AutoTreeBuilder<'a> {
    auto_create: bool,
    key_prefix: Option<String>,
    data: Option<Source<'a>>,
}

impl Default for AutoTreeBuilder<'_> {
    fn default() -> Self {
        Self {
            auto_create: true,
            key_prefix: None,
            data: None,
        }
    }
}

impl<'a> AutoTreeBuilder<'a> {
    pub fn auto_create(mut self, auto_create: bool) -> Self {
        self.auto_create = auto_create;
        self
    }

    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn data(mut self, data: impl Into<Source<'a>>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn build(self) -> Result<AutoTree> {
        let key_prefix = self.key_prefix.unwrap_or_default();
        if !key_prefix.is_empty() && self.data.is_some() {
            return Err(PlexiglassError::Config(
                "prefix must be set before data is loaded".to_string(),
            ));
        }

        let mut tree = AutoTree::with_auto_create(self.auto_create);
        tree.key_prefix = key_prefix;
        if let Some(data) = self.data {
            tree.merge(data)?;
        }
        Ok(tree)
    }
}
