//! Deep merge of sources into tree entries

use std::borrow::Cow;

use serde_json::Value;
use tracing::trace;

use super::node::{entries_from_object, Entries, Node};
use super::AutoTree;
use crate::errors::Result;

/// Anything that can be merged into an [`AutoTree`]
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Serialized JSON object text
    Text(&'a str),
    /// Another tree
    Tree(&'a AutoTree),
    /// A plain mapping
    Entries(&'a Entries),
    /// A parsed JSON value; must be an object
    Value(&'a Value),
}

impl<'a> Source<'a> {
    /// Normalize into a mapping without touching any destination
    pub(crate) fn normalize(self) -> Result<Cow<'a, Entries>> {
        match self {
            Source::Text(text) => {
                let object: serde_json::Map<String, Value> = serde_json::from_str(text)?;
                Ok(Cow::Owned(entries_from_object(object)))
            }
            Source::Value(Value::Object(object)) => Ok(Cow::Owned(entries_from_object(object.clone()))),
            Source::Value(other) => {
                // Non-objects fail here with serde_json's own shape error
                let object: serde_json::Map<String, Value> = serde_json::from_value(other.clone())?;
                Ok(Cow::Owned(entries_from_object(object)))
            }
            Source::Tree(tree) => Ok(Cow::Borrowed(tree.entries())),
            Source::Entries(fields) => Ok(Cow::Borrowed(fields)),
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(text: &'a String) -> Self {
        Source::Text(text)
    }
}

impl<'a> From<&'a AutoTree> for Source<'a> {
    fn from(tree: &'a AutoTree) -> Self {
        Source::Tree(tree)
    }
}

impl<'a> From<&'a Entries> for Source<'a> {
    fn from(fields: &'a Entries) -> Self {
        Source::Entries(fields)
    }
}

impl<'a> From<&'a Value> for Source<'a> {
    fn from(value: &'a Value) -> Self {
        Source::Value(value)
    }
}

/// Merge `source` into `dest`, prefixing every inserted top-level key
///
/// Mappings (in auto mode) and trees merge field by field into a child tree,
/// lists are replaced by independent copies, everything else is copied over.
pub(crate) fn merge_entries(source: &Entries, dest: &mut Entries, auto_create: bool, key_prefix: &str) {
    for (key, value) in source {
        let key = format!("{}{}", key_prefix, key);
        match value {
            Node::Map(fields) if auto_create => merge_into_child(dest, key, fields, auto_create),
            Node::Tree(tree) => merge_into_child(dest, key, tree.entries(), auto_create),
            Node::List(items) => {
                trace!(key = %key, len = items.len(), "replacing list");
                dest.insert(key, Node::List(items.iter().map(resolve).collect()));
            }
            other => {
                dest.insert(key, resolve(other));
            }
        }
    }
}

fn merge_into_child(dest: &mut Entries, key: String, fields: &Entries, auto_create: bool) {
    let slot = dest
        .entry(key)
        .or_insert_with(|| Node::Tree(AutoTree::with_auto_create(auto_create)));
    if !slot.is_tree() {
        let mut child = AutoTree::with_auto_create(auto_create);
        if let Node::Map(existing) = &*slot {
            merge_entries(existing, child.entries_mut(), auto_create, "");
        }
        *slot = Node::Tree(child);
    }
    if let Node::Tree(child) = slot {
        let (child_auto, child_prefix) = (child.auto_create(), child.key_prefix().to_string());
        merge_entries(fields, child.entries_mut(), child_auto, &child_prefix);
    }
}

/// Independent copy of a node; trees are re-snapshotted, lists recurse
pub(crate) fn resolve(node: &Node) -> Node {
    match node {
        Node::Tree(tree) => Node::Tree(tree.snapshot()),
        Node::List(items) => Node::List(items.iter().map(resolve).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: Value) -> Entries {
        match Node::from(value) {
            Node::Map(fields) => fields,
            other => panic!("expected an object, got {}", other.kind()),
        }
    }

    #[test]
    fn test_merge_nested_fields() {
        let mut dest = entries(json!({"first": {"all_rows": {"pass": "dog", "number": "1"}}}));
        // Auto mode converts the destination maps as soon as they are touched
        let source = entries(json!({"first": {"all_rows": {"fail": "cat", "number": "5"}}}));
        merge_entries(&source, &mut dest, true, "");

        let rows = &dest["first"]["all_rows"];
        assert!(dest["first"].is_tree());
        assert_eq!(rows["pass"], "dog");
        assert_eq!(rows["fail"], "cat");
        assert_eq!(rows["number"], "5");
    }

    #[test]
    fn test_strict_merge_replaces_maps() {
        let mut dest = entries(json!({"x": {"a": 1}}));
        let source = entries(json!({"x": {"b": 2}}));
        merge_entries(&source, &mut dest, false, "");

        assert!(matches!(dest["x"], Node::Map(_)));
        assert_eq!(Node::Map(dest).to_string(), r#"{"x":{"b":2}}"#);
    }

    #[test]
    fn test_merge_applies_prefix() {
        let mut dest = Entries::new();
        merge_entries(&entries(json!({"a": 1, "b": {"c": 2}})), &mut dest, true, "p.");

        assert_eq!(dest["p.a"], 1);
        // Nested keys belong to the child tree and are not prefixed
        assert_eq!(dest["p.b"]["c"], 2);
    }

    #[test]
    fn test_child_mode_on_merge() {
        // New children take the parent's mode
        let overlay = AutoTree::from_text(r#"{"inner": {"a": 1}}"#).unwrap();
        let mut source = Entries::new();
        source.insert("x".to_string(), Node::Tree(overlay));
        let mut dest = Entries::new();
        merge_entries(&source, &mut dest, false, "");

        let x = dest["x"].as_tree().unwrap();
        assert!(!x.auto_create());
        assert!(!x["inner"].as_tree().unwrap().auto_create());

        // An existing child keeps its own mode for the nested merge
        let mut strict = AutoTree::strict();
        strict.set_item("m", Node::from(json!({"a": 1})));
        let mut source = Entries::new();
        source.insert("y".to_string(), Node::Tree(strict));
        let mut dest = Entries::new();
        dest.insert("y".to_string(), Node::Tree(AutoTree::new()));
        merge_entries(&source, &mut dest, false, "");

        assert!(dest["y"].as_tree().unwrap().auto_create());
        assert!(dest["y"]["m"].is_tree());
        assert_eq!(dest["y"]["m"]["a"], 1);
    }

    #[test]
    fn test_merge_replaces_scalar_with_tree() {
        let mut dest = entries(json!({"x": 1}));
        merge_entries(&entries(json!({"x": {"y": 2}})), &mut dest, true, "");
        assert_eq!(dest["x"]["y"], 2);
    }

    #[test]
    fn test_resolve_list_of_trees_is_independent() {
        let tree = AutoTree::from_text(r#"{"a": 10}"#).unwrap();
        let list = Node::List(vec![Node::Tree(tree)]);

        let mut copy = resolve(&list);
        copy[0]["a"] = Node::from(20);

        assert_eq!(list[0]["a"], 10);
        assert_eq!(copy[0]["a"], 20);
    }

    #[test]
    fn test_normalize_rejects_non_objects() {
        assert!(Source::Text("[1, 2]").normalize().is_err());
        assert!(Source::Text("not json").normalize().is_err());
        assert!(Source::Value(&json!(3)).normalize().is_err());
        assert!(Source::Value(&json!({"a": 1})).normalize().is_ok());
    }
}
