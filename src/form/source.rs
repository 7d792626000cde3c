//! Document loader - JSON documents with a storage identity.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;

/// A JSON document and the relative path it was loaded from.
///
/// The path is the document's storage identity; the core never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFile {
    pub file_relative_path: String,
    pub data: Value,
}

impl JsonFile {
    /// Wrap already-parsed data.
    pub fn new(file_relative_path: impl Into<String>, data: Value) -> JsonFile {
        JsonFile {
            file_relative_path: file_relative_path.into(),
            data,
        }
    }

    /// Parse `source` as the contents of `file_relative_path`.
    pub fn parse(file_relative_path: impl Into<String>, source: &str) -> Result<JsonFile, FormError> {
        let data = serde_json::from_str(source)?;
        Ok(JsonFile::new(file_relative_path, data))
    }

    /// Read `root/relative` from disk.
    pub fn load(root: impl AsRef<Path>, relative: &str) -> Result<JsonFile, FormError> {
        let source = fs::read_to_string(root.as_ref().join(relative))?;
        JsonFile::parse(relative, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse() {
        let file = JsonFile::parse("data/blocks.json", r#"{ "title": "Hi" }"#).unwrap();
        assert_eq!(file.file_relative_path, "data/blocks.json");
        assert_eq!(file.data, json!({ "title": "Hi" }));
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(matches!(
            JsonFile::parse("x.json", "{ nope"),
            Err(FormError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(
            JsonFile::load("/definitely/not/here", "blocks.json"),
            Err(FormError::Io(_))
        ));
    }
}
