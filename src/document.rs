//! The method catalog as handed to the compiler.
//!
//! Only the envelope is typed here. Schemas stay as raw `serde_json::Value`
//! so that resolution can read them leniently (see [`crate::schema`]).
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DocumentError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub result: Option<ResultSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSpec {
    #[serde(default)]
    pub schema: Option<Value>,
}

impl MethodSpec {
    /// Summary first, then description; blank strings count as missing.
    pub fn doc(&self) -> Option<&str> {
        [self.summary.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }

    pub fn result_schema(&self) -> Option<&Value> {
        self.result.as_ref().and_then(|result| result.schema.as_ref())
    }
}

impl Document {
    pub fn from_str(src: &str) -> Result<Self> {
        from_str_with_path(src)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        from_value_with_path(value)
    }

    /// The external load step. The compiler itself never touches the filesystem.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&source)
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(DocumentError::from_path_error)
}

pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(DocumentError::from_path_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_defaults_and_unknown_keys() {
        let doc = Document::from_value(json!({
            "openrpc": "1.2.6",
            "info": { "title": "node", "version": "1" },
            "methods": [
                { "name": "getblockcount", "result": { "name": "n", "schema": { "type": "integer" } } },
                { "name": "stop" }
            ]
        }))
        .unwrap();
        assert_eq!(doc.methods.len(), 2);
        assert!(doc.methods[0].params.is_empty());
        assert!(doc.methods[0].result_schema().is_some());
        assert!(doc.methods[1].result_schema().is_none());
    }

    #[test]
    fn doc_prefers_non_blank_summary() {
        let doc = Document::from_value(json!({
            "methods": [
                { "name": "a", "summary": "  ", "description": "from description" },
                { "name": "b", "summary": "from summary", "description": "ignored" }
            ]
        }))
        .unwrap();
        assert_eq!(doc.methods[0].doc(), Some("from description"));
        assert_eq!(doc.methods[1].doc(), Some("from summary"));
    }

    #[test]
    fn malformed_document_reports_json_path() {
        let err = Document::from_str(r#"{"methods":[{"name":"ok"},{"name":7}]}"#).unwrap_err();
        match err {
            DocumentError::Malformed { path, .. } => assert_eq!(path, "methods[1].name"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Document::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
