//! Validation error types for target-schema conformance
//!
//! Copyright (c) 2025 Metaconv Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single schema violation with instance-path context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON pointer into the offending instance
    pub path: String,
    /// Human-readable violation message
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "at '{}': {}", self.path, self.message)
        }
    }
}

/// Target-schema validation error with detailed violations
#[derive(Debug, Error, Serialize, Deserialize)]
pub struct ValidationError {
    /// Which target schema was violated (e.g. "CFF 1.2", "DataCite v4")
    pub target: String,
    /// Human-readable summary
    pub message: String,
    /// Detailed schema violations
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed: {}", self.target, self.message)?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl ValidationError {
    /// Create a validation error without violation details
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
            violations: Vec::new(),
        }
    }

    /// Create a validation error carrying its violations
    pub fn with_violations(
        target: impl Into<String>,
        message: impl Into<String>,
        violations: Vec<Violation>,
    ) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
            violations,
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
