//! Canonical text form of a tree
//!
//! Trees serialize to compact JSON in insertion order. The same logical
//! content always yields the same text, which makes it usable for equality
//! checks as well as display.

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::merge::merge_entries;
use super::node::{entries_from_object, entries_to_object};
use super::AutoTree;
use crate::errors::{PlexiglassError, Result};

/// Parse canonical text into a plain JSON object
pub fn from_text(text: &str) -> Result<serde_json::Map<String, Value>> {
    Ok(serde_json::from_str(text)?)
}

impl AutoTree {
    /// Resolve into plain nested JSON
    ///
    /// Fails only if a foreign value cannot be represented as JSON.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        entries_to_object(self.entries()).map(Value::Object)
    }

    /// Canonical compact JSON text
    pub fn to_text(&self) -> Result<String> {
        Ok(self.to_value()?.to_string())
    }

    /// Indented JSON text, for humans
    pub fn to_text_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

impl fmt::Display for AutoTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.to_value().map_err(|_| fmt::Error)?;
        write!(f, "{}", value)
    }
}

impl FromStr for AutoTree {
    type Err = PlexiglassError;

    fn from_str(s: &str) -> Result<Self> {
        AutoTree::from_text(s)
    }
}

impl Serialize for AutoTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, node) in self {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AutoTree {
    /// Deserializes any self-describing object into an auto-creating tree
    ///
    /// Values are taken as JSON sees them. TOML documents with datetimes
    /// should go through [`crate::config::tree_from_toml`] instead.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let object = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut tree = AutoTree::new();
        merge_entries(&entries_from_object(object), tree.entries_mut(), true, "");
        Ok(tree)
    }
}
