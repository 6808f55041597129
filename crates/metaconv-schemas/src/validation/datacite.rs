//! DataCite Metadata Schema v4 structural validation
//!
//! Copyright (c) 2025 Metaconv Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::ValidationResult;
use crate::validation::{compile_schema, run_validator};
use jsonschema::Validator;
use serde_json::Value;
use std::sync::OnceLock;

const DATACITE_SCHEMA: &str = include_str!("../../schemas/datacite-v4.json");

static DATACITE_VALIDATOR: OnceLock<Validator> = OnceLock::new();

fn validator() -> &'static Validator {
    DATACITE_VALIDATOR.get_or_init(|| compile_schema(DATACITE_SCHEMA, "DataCite v4"))
}

/// Validate a document against the bundled DataCite v4 structural schema.
pub fn validate_datacite(instance: &Value) -> ValidationResult<()> {
    run_validator(validator(), instance, "DataCite v4")
}
