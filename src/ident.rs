//! Client identity
//!
//! A random identifier, optionally cached in a file so it survives restarts.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use uuid::Uuid;

use crate::errors::Result;

/// Generate a 32-character hex UUID
///
/// If `path` is given it acts as a cache: non-empty contents are reused, and
/// the resulting value is always written back.
pub fn get_uuid(path: Option<&Path>) -> Result<String> {
    let mut result = Uuid::new_v4().simple().to_string();

    if let Some(path) = path {
        match fs::read_to_string(path) {
            Ok(content) => {
                let cached = content.trim();
                if !cached.is_empty() {
                    result = cached.to_string();
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::write(path, &result)?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_basic_uuid() {
        let value = get_uuid(None).unwrap();
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_uuid_no_dup() {
        assert_ne!(get_uuid(None).unwrap(), get_uuid(None).unwrap());
    }

    #[test]
    fn test_uuid_from_nonexistent_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("uuid");
        assert!(!path.exists());

        let value = get_uuid(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), value);

        // Loading it back reuses the cached value
        assert_eq!(get_uuid(Some(&path)).unwrap(), value);
    }

    #[test]
    fn test_uuid_from_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(fs::read_to_string(file.path()).unwrap().is_empty());

        let first = get_uuid(Some(file.path())).unwrap();
        let second = get_uuid(Some(file.path())).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(file.path()).unwrap().len(), 32);
    }

    #[test]
    fn test_uuid_trims_cached_value() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "  abc123\n").unwrap();
        assert_eq!(get_uuid(Some(file.path())).unwrap(), "abc123");
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "abc123");
    }
}
