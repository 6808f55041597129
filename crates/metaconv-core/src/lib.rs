//! Metaconv Core - field-mapping and rendering engine for scientific-dataset
//! metadata records
//!
//! This crate converts metadata records between a canonical nested record
//! shape (and a legacy flat shape) and several output representations:
//! JSON, YAML, an ERDDAP global-attributes XML fragment, a Citation File
//! Format document, an EML XML document, and DataCite XML/JSON.
//!
//! # Main Components
//!
//! - **Record pipeline**: load a record from a file, URL, raw text, or
//!   in-memory value, normalize the legacy shape to canonical, and convert
//!   through an exhaustive [`OutputFormat`] dispatch
//! - **Field mappers**: per-target select/rename/reformat passes over the
//!   canonical record ([`mappers`])
//! - **Diagnostics**: recoverable degradations are accumulated in
//!   [`Diagnostics`] instead of being logged and lost
//! - **ERDDAP update**: comment-preserving upsert of global attributes into
//!   existing `datasets.xml` documents ([`erddap`])
//!
//! # Example
//!
//! ```no_run
//! use metaconv_core::{ConvertOptions, Diagnostics, InputSchema, OutputFormat, Record};
//! use serde_json::json;
//!
//! fn example() -> metaconv_core::Result<()> {
//!     let record = Record::from_value(json!({"..": ".."}), InputSchema::Cioos);
//!     let mut diagnostics = Diagnostics::new();
//!     let yaml = record.convert_to(
//!         OutputFormat::Yaml,
//!         &ConvertOptions::default(),
//!         &mut diagnostics,
//!     )?;
//!     println!("{yaml}");
//!     Ok(())
//! }
//! ```

pub mod citation;
pub mod diagnostics;
pub mod erddap;
pub mod error;
pub mod mappers;
pub mod record;
pub mod references;
pub mod value;

// Re-export main types for convenience
pub use citation::{generate_citation, CitationFormat};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{Error, Result};
pub use record::{ConvertOptions, InputSchema, OutputFormat, Record, RecordSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
