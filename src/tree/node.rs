//! Values stored in an [`AutoTree`]
//!
//! A [`Node`] is either a leaf (scalar, list, plain mapping, foreign value)
//! or a nested [`AutoTree`].

use std::any::Any;
use std::fmt;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::{Number, Value};

use super::AutoTree;

/// Ordered name to node mapping, used for tree entries and plain mappings
pub type Entries = IndexMap<String, Node>;

/// A user type stored in a tree as-is
///
/// Foreign values are never converted into trees. Merges and snapshots clone
/// them through [`ForeignValue::clone_box`], so they keep their concrete type
/// and can be recovered with [`Node::downcast_ref`].
pub trait ForeignValue: fmt::Debug + Send + Sync + 'static {
    /// Concrete type name, used for equality and diagnostics
    fn type_name(&self) -> &'static str;

    /// JSON rendering used for canonical text
    ///
    /// Object keys are sorted at every level, so unordered containers such
    /// as `HashMap` render the same way for the same content.
    fn to_json(&self) -> serde_json::Result<Value>;

    fn clone_box(&self) -> Box<dyn ForeignValue>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> ForeignValue for T
where
    T: Clone + fmt::Debug + Serialize + Send + Sync + 'static,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self).map(sort_keys)
    }

    fn clone_box(&self) -> Box<dyn ForeignValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A single value in a tree
#[derive(Debug)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Ordered sequence; replaced wholesale on merge
    List(Vec<Node>),
    /// Plain mapping; only kept unconverted under strict trees
    Map(Entries),
    /// Nested tree
    Tree(AutoTree),
    /// Opaque user value
    Foreign(Box<dyn ForeignValue>),
}

impl Node {
    /// Wrap a user value so it is stored without conversion
    pub fn foreign<T: ForeignValue>(value: T) -> Self {
        Node::Foreign(Box::new(value))
    }

    /// Short name of the node kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::List(_) => "list",
            Node::Map(_) => "map",
            Node::Tree(_) => "tree",
            Node::Foreign(_) => "foreign",
        }
    }

    /// Number node for a finite float, `None` for NaN and infinities
    pub fn from_finite(n: f64) -> Option<Self> {
        Number::from_f64(n).map(Node::Number)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Node::Tree(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Node::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Node>> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Entries> {
        match self {
            Node::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Entries> {
        match self {
            Node::Map(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&AutoTree> {
        match self {
            Node::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_tree_mut(&mut self) -> Option<&mut AutoTree> {
        match self {
            Node::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Recover a foreign value as its concrete type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Node::Foreign(value) => {
                let value: &dyn ForeignValue = &**value;
                value.as_any().downcast_ref::<T>()
            }
            _ => None,
        }
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        match self {
            Node::Foreign(value) => {
                let value: &mut dyn ForeignValue = &mut **value;
                value.as_any_mut().downcast_mut::<T>()
            }
            _ => None,
        }
    }

    /// Resolve into plain JSON, recursing through trees and lists
    ///
    /// Fails only if a foreign value cannot be represented as JSON.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        Ok(match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::List(items) => Value::Array(items.iter().map(Node::to_value).collect::<serde_json::Result<_>>()?),
            Node::Map(fields) => Value::Object(entries_to_object(fields)?),
            Node::Tree(tree) => return tree.to_value(),
            Node::Foreign(value) => return value.to_json(),
        })
    }
}

pub(crate) fn entries_to_object(entries: &Entries) -> serde_json::Result<serde_json::Map<String, Value>> {
    entries
        .iter()
        .map(|(key, node)| Ok((key.clone(), node.to_value()?)))
        .collect()
}

/// Recursively order object keys
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut fields: Vec<(String, Value)> = object.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(fields.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

pub(crate) fn entries_from_object(object: serde_json::Map<String, Value>) -> Entries {
    object
        .into_iter()
        .map(|(key, value)| (key, Node::from(value)))
        .collect()
}

impl Clone for Node {
    fn clone(&self) -> Self {
        match self {
            Node::Null => Node::Null,
            Node::Bool(b) => Node::Bool(*b),
            Node::Number(n) => Node::Number(n.clone()),
            Node::String(s) => Node::String(s.clone()),
            Node::List(items) => Node::List(items.clone()),
            Node::Map(fields) => Node::Map(fields.clone()),
            Node::Tree(tree) => Node::Tree(tree.clone()),
            Node::Foreign(value) => Node::Foreign(value.clone_box()),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::List(a), Node::List(b)) => a == b,
            (Node::Map(a), Node::Map(b)) => a == b,
            (Node::Tree(a), Node::Tree(b)) => a == b,
            (Node::Foreign(a), Node::Foreign(b)) => {
                a.type_name() == b.type_name()
                    && matches!((a.to_json(), b.to_json()), (Ok(x), Ok(y)) if x == y)
            }
            _ => false,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::Null
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(fields) => fields.serialize(serializer),
            Node::Tree(tree) => tree.serialize(serializer),
            Node::Foreign(value) => value
                .to_json()
                .map_err(<S::Error as serde::ser::Error>::custom)?
                .serialize(serializer),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.to_value().map_err(|_| fmt::Error)?;
        write!(f, "{}", value)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(n: $ty) -> Self {
                    Node::Number(Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// NaN and infinities have no JSON form and become [`Node::Null`].
/// Use [`Node::from_finite`] to reject them instead.
impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Node::Number).unwrap_or(Node::Null)
    }
}

impl From<f32> for Node {
    fn from(n: f32) -> Self {
        Node::from(f64::from(n))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Node::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Node::Null)
    }
}

impl From<Entries> for Node {
    fn from(fields: Entries) -> Self {
        Node::Map(fields)
    }
}

impl From<AutoTree> for Node {
    fn from(tree: AutoTree) -> Self {
        Node::Tree(tree)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Object(object) => Node::Map(entries_from_object(object)),
        }
    }
}

// ============================================================================
// Comparisons against plain Rust values
// ============================================================================

macro_rules! eq_number {
    ($($ty:ty => $conv:ident),*) => {
        $(
            impl PartialEq<$ty> for Node {
                fn eq(&self, other: &$ty) -> bool {
                    match self {
                        Node::Number(n) => n.$conv() == Some(*other as _),
                        _ => false,
                    }
                }
            }
        )*
    };
}

eq_number!(
    i8 => as_i64, i16 => as_i64, i32 => as_i64, i64 => as_i64, isize => as_i64,
    u8 => as_u64, u16 => as_u64, u32 => as_u64, u64 => as_u64, usize => as_u64,
    f32 => as_f64, f64 => as_f64
);

impl PartialEq<bool> for Node {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<str> for Node {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl<'a> PartialEq<&'a str> for Node {
    fn eq(&self, other: &&'a str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<String> for Node {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == Some(other.as_str())
    }
}

// ============================================================================
// Index sugar
// ============================================================================

impl Index<&str> for Node {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if the node is not a tree or mapping, or the name is missing.
    fn index(&self, key: &str) -> &Node {
        match self {
            Node::Tree(tree) => &tree[key],
            Node::Map(fields) => match fields.get(key) {
                Some(node) => node,
                None => panic!("no entry found for key '{}'", key),
            },
            other => panic!("cannot index a {} node with '{}'", other.kind(), key),
        }
    }
}

impl IndexMut<&str> for Node {
    /// Auto-vivifies missing names on auto-creating trees.
    ///
    /// # Panics
    ///
    /// Panics on a strict miss, or if the node is not a tree or mapping.
    fn index_mut(&mut self, key: &str) -> &mut Node {
        match self {
            Node::Tree(tree) => &mut tree[key],
            Node::Map(fields) => match fields.get_mut(key) {
                Some(node) => node,
                None => panic!("no entry found for key '{}'", key),
            },
            other => panic!("cannot index a {} node with '{}'", other.kind(), key),
        }
    }
}

impl Index<usize> for Node {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if the node is not a list or the index is out of bounds.
    fn index(&self, idx: usize) -> &Node {
        match self {
            Node::List(items) => &items[idx],
            other => panic!("cannot index a {} node with [{}]", other.kind(), idx),
        }
    }
}

impl IndexMut<usize> for Node {
    fn index_mut(&mut self, idx: usize) -> &mut Node {
        match self {
            Node::List(items) => &mut items[idx],
            other => panic!("cannot index a {} node with [{}]", other.kind(), idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_from_json_keeps_objects_plain() {
        let node = Node::from(serde_json::json!({"a": {"b": 1}}));
        assert!(matches!(node, Node::Map(_)));
        assert!(matches!(node["a"], Node::Map(_)));
        assert_eq!(node["a"]["b"], 1);
    }

    #[test]
    fn test_to_value_preserves_order() {
        let node = Node::from(serde_json::json!({"z": 1, "a": [true, null, "x"]}));
        assert_eq!(node.to_string(), r#"{"z":1,"a":[true,null,"x"]}"#);
    }

    #[test]
    fn test_scalar_comparisons() {
        assert_eq!(Node::from(10), 10);
        assert_eq!(Node::from(2.5), 2.5);
        assert_eq!(Node::from("hi"), "hi");
        assert_eq!(Node::from(true), true);
        assert_ne!(Node::from("10"), 10);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert!(Node::from(f64::NAN).is_null());
        assert!(Node::from(f64::INFINITY).is_null());
        assert!(Node::from_finite(f64::NAN).is_none());
        assert!(Node::from_finite(f64::NEG_INFINITY).is_none());
        assert_eq!(Node::from_finite(1.5), Some(Node::from(1.5)));
    }

    #[test]
    fn test_foreign_clone_keeps_type() {
        let mut counter: BTreeMap<String, u32> = BTreeMap::new();
        counter.insert("hits".to_string(), 3);

        let node = Node::foreign(counter);
        let copy = node.clone();

        let inner = copy.downcast_ref::<BTreeMap<String, u32>>().unwrap();
        assert_eq!(inner.get("hits"), Some(&3));
        assert_eq!(node, copy);
        assert_eq!(copy.to_string(), r#"{"hits":3}"#);
    }

    #[test]
    fn test_foreign_downcast_mut_is_independent() {
        let original = Node::foreign(vec![1u8, 2, 3]);
        let mut copy = original.clone();
        copy.downcast_mut::<Vec<u8>>().unwrap().push(4);

        assert_eq!(original.downcast_ref::<Vec<u8>>().unwrap().len(), 3);
        assert_eq!(copy.downcast_ref::<Vec<u8>>().unwrap().len(), 4);
    }

    #[test]
    fn test_downcast_wrong_type() {
        let node = Node::foreign(7u32);
        assert!(node.downcast_ref::<String>().is_none());
        assert!(Node::from(7).downcast_ref::<u32>().is_none());
    }

    #[test]
    #[should_panic(expected = "cannot index a number node")]
    fn test_index_scalar_panics() {
        let node = Node::from(1);
        let _ = &node["a"];
    }
}
