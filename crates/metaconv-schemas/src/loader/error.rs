//! Error types for record source loading
//!
//! Copyright (c) 2025 Metaconv Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Error types for record source loading operations
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read source '{source_id}': {source}")]
    Io {
        source_id: String,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML from '{source_id}': {source}")]
    YamlParse {
        source_id: String,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON from '{source_id}': {source}")]
    JsonParse {
        source_id: String,
        source: serde_json::Error,
    },

    /// Declared-encoding decode failures
    #[error("Failed to decode '{source_id}' as {encoding}: {reason}")]
    Encoding {
        source_id: String,
        encoding: String,
        reason: String,
    },

    /// Unrecognized encoding label
    #[error("Unknown encoding '{label}'. Supported encodings are: utf-8, latin-1")]
    UnknownEncoding { label: String },
}

impl LoaderError {
    /// Create an I/O error with source context
    pub fn io(source_id: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            source_id: source_id.into(),
            source,
        }
    }

    /// Create a YAML parsing error with source context
    pub fn yaml_parse(source_id: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::YamlParse {
            source_id: source_id.into(),
            source,
        }
    }

    /// Create a JSON parsing error with source context
    pub fn json_parse(source_id: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            source_id: source_id.into(),
            source,
        }
    }

    /// Create a decode error with source context
    pub fn encoding(
        source_id: impl Into<String>,
        encoding: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Encoding {
            source_id: source_id.into(),
            encoding: encoding.into(),
            reason: reason.into(),
        }
    }
}
