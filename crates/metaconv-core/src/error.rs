//! Error types for the metadata conversion engine
//!
//! This module defines the error taxonomy for the conversion pipeline,
//! using thiserror for ergonomic error definitions. Recoverable
//! degradations are not errors; they are collected in
//! [`crate::diagnostics::Diagnostics`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unparseable input
    #[error("Failed to parse '{source_id}': {message}")]
    Parse { source_id: String, message: String },

    /// Input bytes do not decode under the declared encoding
    #[error("Failed to decode '{source_id}': {message}")]
    Encoding { source_id: String, message: String },

    /// Remote record fetch failed (non-2xx response or transport error)
    #[error("Failed to fetch '{url}': {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Caller passed an unrecognized input schema name
    #[error("Unsupported schema: {value}. Supported schemas are: {expected}")]
    UnsupportedSchema { value: String, expected: String },

    /// Caller passed an unrecognized output format name
    #[error("Unsupported output format: {value}. Supported formats are: {expected}")]
    UnsupportedFormat { value: String, expected: String },

    /// A record lacks a field a mapper requires
    #[error("Record is missing required field '{path}'")]
    MissingField { path: String },

    /// Duplicate dataset ID within one ERDDAP datasets.xml document
    #[error("Duplicate dataset ID '{dataset_id}' found in '{}'", path.display())]
    DuplicateDatasetId { dataset_id: String, path: PathBuf },

    /// Mapper output does not conform to its target schema
    #[error(transparent)]
    SchemaValidation(#[from] metaconv_schemas::ValidationError),

    /// XML reading/writing errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a parse error with source context
    pub fn parse(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create a missing-field error for a dotted record path
    pub fn missing_field(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }
}

impl From<metaconv_schemas::LoaderError> for Error {
    fn from(err: metaconv_schemas::LoaderError) -> Self {
        use metaconv_schemas::LoaderError;
        match err {
            LoaderError::Io { source_id, source } => Error::Parse {
                source_id,
                message: source.to_string(),
            },
            LoaderError::YamlParse { source_id, source } => Error::Parse {
                source_id,
                message: source.to_string(),
            },
            LoaderError::JsonParse { source_id, source } => Error::Parse {
                source_id,
                message: source.to_string(),
            },
            LoaderError::Encoding {
                source_id,
                encoding,
                reason,
            } => Error::Encoding {
                source_id,
                message: format!("{reason} (declared encoding: {encoding})"),
            },
            LoaderError::UnknownEncoding { label } => Error::Encoding {
                source_id: "<input>".to_string(),
                message: format!("unknown encoding '{label}'"),
            },
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch {
            url: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
