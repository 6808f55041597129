//! Conversion diagnostics accumulator
//!
//! Mappers degrade gracefully on malformed optional sub-structures: the
//! affected field is omitted or falls back, and the degradation is recorded
//! here instead of disappearing into the log stream. Tests assert on the
//! exact set of degraded fields; the tracing log entry is emitted at record
//! time as a side effect.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of degradation occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// More than one contact matched a single-contact role; first wins
    MultipleMatches,
    /// A contact role has no mapping in the target vocabulary
    UnmappedRole,
    /// A country name could not be resolved to a two-letter code
    UnresolvedCountry,
    /// An optional sub-structure had an unrecognized shape
    InvalidShape,
    /// A distribution resource was skipped (e.g. non-HTTP URL)
    SkippedResource,
    /// An optional field was absent and its output omitted
    MissingOptional,
    /// A deprecated format alias was used
    Deprecated,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCode::MultipleMatches => write!(f, "MultipleMatches"),
            DiagnosticCode::UnmappedRole => write!(f, "UnmappedRole"),
            DiagnosticCode::UnresolvedCountry => write!(f, "UnresolvedCountry"),
            DiagnosticCode::InvalidShape => write!(f, "InvalidShape"),
            DiagnosticCode::SkippedResource => write!(f, "SkippedResource"),
            DiagnosticCode::MissingOptional => write!(f, "MissingOptional"),
            DiagnosticCode::Deprecated => write!(f, "Deprecated"),
        }
    }
}

/// Severity of a recorded degradation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Output degraded, should be reviewed
    Warning,
    /// Output degraded in a way that likely needs fixing upstream
    Error,
}

/// A single recorded degradation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    pub code: DiagnosticCode,
    /// Dotted record path the degradation applies to
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

/// Accumulator for degradations during a single conversion
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a degradation at warning severity
    pub fn warn(&mut self, code: DiagnosticCode, path: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(code = %code, path, "{message}");
        self.items.push(DiagnosticItem {
            code,
            path: path.to_string(),
            message,
            severity: Severity::Warning,
        });
    }

    /// Record a degradation at error severity (conversion still proceeds)
    pub fn error(&mut self, code: DiagnosticCode, path: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(code = %code, path, "{message}");
        self.items.push(DiagnosticItem {
            code,
            path: path.to_string(),
            message,
            severity: Severity::Error,
        });
    }

    /// Record an informational note (e.g. an omitted optional field)
    pub fn info(&mut self, code: DiagnosticCode, path: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(code = %code, path, "{message}");
        self.items.push(DiagnosticItem {
            code,
            path: path.to_string(),
            message,
            severity: Severity::Info,
        });
    }

    /// All recorded items, in recording order
    pub fn items(&self) -> &[DiagnosticItem] {
        &self.items
    }

    /// Items with a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |item| item.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if any item is at warning severity or above
    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|item| item.severity >= Severity::Warning)
    }
}
