//! Source parsing for YAML and JSON record formats
//!
//! Copyright (c) 2025 Metaconv Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported source formats for record parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from a file extension, case-insensitively.
    ///
    /// Returns `None` for unrecognized or missing extensions; the caller
    /// falls back to content sniffing.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str())?;
        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    /// Detect format from raw text: JSON documents lead with `{` or `[`.
    pub fn sniff(text: &str) -> Self {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            Format::Json
        } else {
            Format::Yaml
        }
    }

    /// Get the primary file extension for this format
    pub fn primary_extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

/// Record parser with support for both source formats
#[derive(Debug, Default)]
pub struct SourceParser;

impl SourceParser {
    /// Create a new source parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a record file, detecting format from its extension and
    /// sniffing the content when the extension is unrecognized.
    pub fn parse_file(&self, path: &Path, encoding: &str) -> LoaderResult<Value> {
        let source_id = path.display().to_string();
        let bytes =
            std::fs::read(path).map_err(|e| LoaderError::io(source_id.clone(), e))?;
        let content = self.decode(&bytes, encoding, &source_id)?;
        let format = Format::from_path(path).unwrap_or_else(|| Format::sniff(&content));
        self.parse_content(&content, format, &source_id)
    }

    /// Parse raw text, sniffing the format from its leading character.
    pub fn parse_text(&self, text: &str, source_id: &str) -> LoaderResult<Value> {
        self.parse_content(text, Format::sniff(text), source_id)
    }

    /// Parse record content with an explicit format
    pub fn parse_content(
        &self,
        content: &str,
        format: Format,
        source_id: &str,
    ) -> LoaderResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, source_id),
            Format::Json => self.parse_json(content, source_id),
        }
    }

    /// Parse YAML content.
    ///
    /// serde_yaml never executes tags, so this is safe-load by construction.
    pub fn parse_yaml(&self, content: &str, source_id: &str) -> LoaderResult<Value> {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse(source_id, e))?;

        // Convert to JSON Value for uniform downstream handling
        serde_json::to_value(yaml_value).map_err(|e| LoaderError::json_parse(source_id, e))
    }

    /// Parse JSON content
    pub fn parse_json(&self, content: &str, source_id: &str) -> LoaderResult<Value> {
        serde_json::from_str(content).map_err(|e| LoaderError::json_parse(source_id, e))
    }

    /// Decode raw bytes using a declared encoding label.
    ///
    /// `utf-8` and `latin-1` are recognized; anything else is an error
    /// rather than a silent fallback.
    pub fn decode(&self, bytes: &[u8], encoding: &str, source_id: &str) -> LoaderResult<String> {
        match encoding.to_lowercase().as_str() {
            "utf-8" | "utf8" => String::from_utf8(bytes.to_vec()).map_err(|e| {
                LoaderError::encoding(source_id, encoding, e.to_string())
            }),
            "latin-1" | "latin1" | "iso-8859-1" => {
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
            _ => Err(LoaderError::UnknownEncoding {
                label: encoding.to_string(),
            }),
        }
    }

    /// Serialize a value back to string form in the given format
    pub fn serialize(&self, value: &Value, format: Format) -> LoaderResult<String> {
        match format {
            Format::Json => serde_json::to_string_pretty(value)
                .map_err(|e| LoaderError::json_parse("<serialize>", e)),
            Format::Yaml => {
                let yaml_value: serde_yaml::Value = serde_json::from_value(value.clone())
                    .map_err(|e| LoaderError::json_parse("<serialize>", e))?;
                serde_yaml::to_string(&yaml_value)
                    .map_err(|e| LoaderError::yaml_parse("<serialize>", e))
            }
        }
    }
}
