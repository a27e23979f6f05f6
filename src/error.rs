//! Typed errors for the structural failures of loading and exporting.
//!
//! Anything inside a survey schema or an answer that merely looks odd is
//! absorbed by the aggregation code; only documents that cannot be
//! interpreted at all end up here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while interpreting the input documents.
#[derive(Debug, Error)]
pub enum InputError {
    /// The survey document was not a JSON object.
    #[error("survey schema must be a JSON object, found {found}")]
    SchemaNotAnObject { found: &'static str },

    /// The responses document had an unsupported top-level shape.
    #[error("responses must be a JSON array or an object with a `responses` array, found {found}")]
    UnsupportedResponses { found: &'static str },

    /// A single response entry could not be read as an answers mapping.
    #[error("response #{index} is not a JSON object")]
    ResponseNotAnObject { index: usize },

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file did not contain valid JSON.
    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("worksheet `{0}` not found in workbook")]
    MissingSheet(String),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unsupported output format `{0}`")]
    UnsupportedFormat(String),
}

/// Short name of a JSON value's kind, used in error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([1])), "an array");
        assert_eq!(json_kind(&json!({"a": 1})), "an object");
    }

    #[test]
    fn test_error_messages() {
        let err = InputError::SchemaNotAnObject { found: "an array" };
        assert_eq!(
            err.to_string(),
            "survey schema must be a JSON object, found an array"
        );

        let err = ExportError::MissingSheet("Grafik".to_string());
        assert!(err.to_string().contains("Grafik"));
    }
}
