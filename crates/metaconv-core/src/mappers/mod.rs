//! Field mappers from the canonical record shape to target schemas
//!
//! Each mapper consumes a record value tree and produces a target-shaped
//! mapping by selecting, renaming, and reformatting fields. Degradations
//! are collected in the caller's [`crate::Diagnostics`]; structural
//! failures surface as [`crate::Error`].

pub mod acdd;
pub mod cff;
pub mod datacite;
pub mod eml;

/// True if any element of `roles` equals `role`.
pub(crate) fn has_role(contact: &serde_json::Value, role: &str) -> bool {
    contact
        .get("roles")
        .and_then(serde_json::Value::as_array)
        .map(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
        .unwrap_or(false)
}

/// Extract a DOI from a dataset identifier.
///
/// Identifiers carrying a `doi.org/` URL are stripped to the suffix; bare
/// `10.`-prefixed identifiers pass through; anything else is not a DOI.
pub(crate) fn extract_doi(identifier: &str) -> Option<String> {
    if let Some(pos) = identifier.find("doi.org/") {
        let doi = &identifier[pos + "doi.org/".len()..];
        (!doi.is_empty()).then(|| doi.to_string())
    } else if identifier.starts_with("10.") {
        Some(identifier.to_string())
    } else {
        None
    }
}
