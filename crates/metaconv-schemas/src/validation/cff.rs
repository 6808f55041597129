//! Citation File Format 1.2 structural validation
//!
//! Copyright (c) 2025 Metaconv Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::ValidationResult;
use crate::validation::{compile_schema, run_validator};
use jsonschema::Validator;
use serde_json::Value;
use std::sync::OnceLock;

const CFF_SCHEMA: &str = include_str!("../../schemas/cff-1.2.json");

static CFF_VALIDATOR: OnceLock<Validator> = OnceLock::new();

fn validator() -> &'static Validator {
    CFF_VALIDATOR.get_or_init(|| compile_schema(CFF_SCHEMA, "CFF 1.2"))
}

/// Validate a document against the bundled CFF 1.2 structural schema.
pub fn validate_cff(instance: &Value) -> ValidationResult<()> {
    run_validator(validator(), instance, "CFF 1.2")
}
