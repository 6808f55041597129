//! Structural validation for conversion target schemas
//!
//! The CFF and DataCite renderers must emit documents that other tools
//! accept. This module compiles bundled JSON Schemas (structural subsets of
//! the official CFF 1.2 and DataCite Metadata Schema v4 definitions) once
//! per process and exposes one validation entry point per target.
//!
//! Copyright (c) 2025 Metaconv Team
//! Licensed under the Apache-2.0 license

pub mod cff;
pub mod datacite;
pub mod error;

pub use cff::validate_cff;
pub use datacite::validate_datacite;
pub use error::{ValidationError, ValidationResult, Violation};

use jsonschema::Validator;
use serde_json::Value;

/// Compile a bundled schema document into a reusable validator.
///
/// Bundled schemas are part of the crate, so compilation failure is a build
/// defect, not a runtime condition.
pub(crate) fn compile_schema(schema_text: &str, name: &str) -> Validator {
    let schema: Value = serde_json::from_str(schema_text)
        .unwrap_or_else(|e| panic!("bundled {name} schema is not valid JSON: {e}"));
    jsonschema::validator_for(&schema)
        .unwrap_or_else(|e| panic!("bundled {name} schema does not compile: {e}"))
}

/// Run a compiled validator, collecting all schema violations.
pub(crate) fn run_validator(
    validator: &Validator,
    instance: &Value,
    target: &str,
) -> ValidationResult<()> {
    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|error| Violation {
            path: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::with_violations(
            target,
            format!("document does not conform to the {target} schema"),
            violations,
        ))
    }
}
