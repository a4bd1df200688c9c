use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

/// Fatal failures. Anything that only affects a single entity or reference is reported as a
/// [`crate::codec::Diagnostic`] instead and never aborts a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum GenJsonError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Invalid entity key '{0}'. Expected '<kind>:<id>' or an ID with a known kind prefix")]
    InvalidKey(String),
    #[error("Section '{section}' must be a mapping keyed by entity ID, found {found}")]
    InvalidSection { section: String, found: String },
    #[error("Document root must be a JSON object, found {found}")]
    NotAnObject { found: String },
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("Document rejected by schema validation: {}", .0.join("; "))]
    SchemaRejected(Vec<String>),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl GenJsonError {
    /// Whether the error stems from the shape of the input document rather than from the
    /// environment (files, configuration).
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            GenJsonError::InvalidSection { .. }
                | GenJsonError::NotAnObject { .. }
                | GenJsonError::SchemaRejected(_)
        )
    }
}

impl From<toml::de::Error> for GenJsonError {
    fn from(src: toml::de::Error) -> GenJsonError {
        GenJsonError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for GenJsonError {
    fn from(src: toml::ser::Error) -> GenJsonError {
        GenJsonError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for GenJsonError {
    fn from(src: JsonError) -> GenJsonError {
        GenJsonError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for GenJsonError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => GenJsonError::NotFound(format!("{x}")),
            _ => GenJsonError::Io(format!("IOError: {}", x.kind())),
        }
    }
}
