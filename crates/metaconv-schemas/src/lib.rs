//! Metaconv Schemas - source parsing and target-schema validation
//!
//! This crate provides the two schema-facing layers of the metadata
//! conversion pipeline:
//!
//! - **Loader**: parsing of JSON/YAML record sources into `serde_json::Value`
//!   trees, with extension-based format detection, content sniffing for
//!   extensionless sources, and declared-encoding decoding
//! - **Validation**: structural validators for the external target schemas
//!   (Citation File Format 1.2, DataCite Metadata Schema v4) backed by
//!   bundled JSON Schemas compiled once per process
//!
//! ## Quick Start
//!
//! ```rust
//! use metaconv_schemas::validation::validate_cff;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "cff-version": "1.2.0",
//!     "message": "If you use this dataset, please cite it as below",
//!     "title": "Example dataset",
//!     "authors": [{"name": "Example Institute"}],
//!     "date-released": "2023-01-01",
//! });
//! assert!(validate_cff(&doc).is_ok());
//! ```
//!
//! Copyright (c) 2025 Metaconv Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod validation;

// Re-export commonly used types for convenience
pub use loader::{Format, LoaderError, LoaderResult, SourceParser};
pub use validation::{
    validate_cff, validate_datacite, ValidationError, ValidationResult, Violation,
};
