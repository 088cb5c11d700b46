//! Config file handling
//!
//! Config files are plain JSON or TOML documents loaded into an
//! [`AutoTree`], so they can be layered with other settings by merging.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::PlexiglassError;
use crate::tree::AutoTree;

/// Environment variable that overrides the config directory
pub const CONFIG_DIR_ENV: &str = "PLEXIGLASS_CONFIG_DIR";

/// Get the default config directory
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|p| p.join(env!("CARGO_PKG_NAME")))
        .unwrap_or_else(|| PathBuf::from(concat!(".", env!("CARGO_PKG_NAME"))))
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load a config file into an auto-creating tree
///
/// A missing file yields an empty tree. The format follows the extension:
/// `.json` is parsed as JSON, `.toml` (or no extension) as TOML.
pub fn load_config_tree(path: &Path) -> Result<AutoTree, PlexiglassError> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(AutoTree::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| PlexiglassError::Config(format!("Failed to read config: {}", e)))?;

    let tree = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => AutoTree::from_text(&content)
            .map_err(|e| PlexiglassError::Config(format!("Invalid config JSON: {}", e)))?,
        Some("toml") | None => tree_from_toml(&content)?,
        Some(other) => {
            return Err(PlexiglassError::Config(format!(
                "Unsupported config format '.{}'",
                other
            )))
        }
    };

    debug!(path = %path.display(), keys = tree.len(), "config loaded");
    Ok(tree)
}

/// Parse a TOML document into an auto-creating tree
///
/// Datetimes are kept as their RFC 3339 text. Non-finite floats have no JSON
/// form and are rejected.
pub fn tree_from_toml(text: &str) -> Result<AutoTree, PlexiglassError> {
    let table: toml::Table = toml::from_str(text)
        .map_err(|e| PlexiglassError::Config(format!("Invalid config TOML: {}", e)))?;

    let mut object = serde_json::Map::with_capacity(table.len());
    for (key, value) in table {
        object.insert(key, toml_to_json(value)?);
    }

    let mut tree = AutoTree::new();
    tree.merge(&Value::Object(object))?;
    Ok(tree)
}

fn toml_to_json(value: toml::Value) -> Result<Value, PlexiglassError> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => match serde_json::Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => {
                return Err(PlexiglassError::Config(format!(
                    "Config float '{}' has no JSON form",
                    f
                )))
            }
        },
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => {
            let mut object = serde_json::Map::with_capacity(table.len());
            for (key, value) in table {
                object.insert(key, toml_to_json(value)?);
            }
            Value::Object(object)
        }
    })
}
