//! Record pipeline: load, normalize, convert
//!
//! A [`Record`] carries a parsed metadata value tree together with its
//! declared input schema. Conversion runs the pipeline
//! loader → normalizer → field mapper → renderer, dispatching on a closed
//! [`OutputFormat`] enum so every format is handled exhaustively.

pub mod normalize;

use crate::citation::{generate_citation, CitationFormat};
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{Error, Result};
use crate::mappers::{acdd, cff, datacite, eml};
use metaconv_schemas::SourceParser;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Recognized input schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSchema {
    /// The canonical record shape
    Cioos,
    /// The legacy flat record shape
    Firebase,
}

impl InputSchema {
    /// Recognized schema names, as accepted by [`InputSchema::parse`]
    pub const NAMES: [&'static str; 2] = ["CIOOS", "firebase"];

    /// Parse a schema name.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "CIOOS" => Ok(InputSchema::Cioos),
            "firebase" => Ok(InputSchema::Firebase),
            _ => Err(Error::UnsupportedSchema {
                value: value.to_string(),
                expected: Self::NAMES.join(", "),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputSchema::Cioos => "CIOOS",
            InputSchema::Firebase => "firebase",
        }
    }
}

impl fmt::Display for InputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conversion target formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    /// ERDDAP `<addAttributes>` XML fragment
    Erddap,
    /// Citation File Format YAML document
    Cff,
    /// EML XML document (also served by the deprecated `xml` aliases)
    Eml,
    DataCiteJson,
    DataCiteXml,
}

impl OutputFormat {
    /// Canonical format names, as accepted by [`OutputFormat::parse`]
    pub const NAMES: [&'static str; 7] = [
        "json",
        "yaml",
        "erddap",
        "cff",
        "eml",
        "datacite_json",
        "datacite_xml",
    ];

    /// Parse a format name. The deprecated `xml`/`iso19115_xml`/
    /// `iso19115-3_xml` aliases resolve to the EML renderer with a warning.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "erddap" => Ok(OutputFormat::Erddap),
            "cff" => Ok(OutputFormat::Cff),
            "eml" => Ok(OutputFormat::Eml),
            "xml" | "iso19115_xml" | "iso19115-3_xml" => {
                tracing::warn!("{value} format is deprecated, use 'eml' instead");
                Ok(OutputFormat::Eml)
            }
            "datacite_json" => Ok(OutputFormat::DataCiteJson),
            "datacite_xml" => Ok(OutputFormat::DataCiteXml),
            _ => Err(Error::UnsupportedFormat {
                value: value.to_string(),
                expected: Self::NAMES.join(", "),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Erddap => "erddap",
            OutputFormat::Cff => "cff",
            OutputFormat::Eml => "eml",
            OutputFormat::DataCiteJson => "datacite_json",
            OutputFormat::DataCiteXml => "datacite_xml",
        }
    }

    /// File extension for converted output files
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::DataCiteJson => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Cff => "cff",
            OutputFormat::Erddap | OutputFormat::Eml | OutputFormat::DataCiteXml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a record comes from
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// An in-memory mapping
    Value(Value),
    /// A local file path
    Path(PathBuf),
    /// An HTTP(S) URL
    Url(String),
    /// Raw JSON or YAML text
    Text(String),
}

impl RecordSource {
    /// Classify a CLI input string: URL, file path (by extension), or raw
    /// text.
    pub fn from_input(input: &str) -> Self {
        let lowercase = input.to_lowercase();
        if lowercase.starts_with("http://") || lowercase.starts_with("https://") {
            RecordSource::Url(input.to_string())
        } else if lowercase.ends_with(".json")
            || lowercase.ends_with(".yaml")
            || lowercase.ends_with(".yml")
        {
            RecordSource::Path(PathBuf::from(input))
        } else {
            RecordSource::Text(input.to_string())
        }
    }

    /// Identifier used in error messages
    pub fn id(&self) -> String {
        match self {
            RecordSource::Value(_) => "<value>".to_string(),
            RecordSource::Path(path) => path.display().to_string(),
            RecordSource::Url(url) => url.clone(),
            RecordSource::Text(_) => "<text>".to_string(),
        }
    }
}

/// Options shared by the conversion renderers
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Language selected from language-keyed maps
    pub language: String,
    /// Precomputed citation for EML output; generated when absent
    pub citation: Option<String>,
    /// CFF citation message
    pub cff_message: String,
    /// Base URL for metadata-record URLs
    pub resource_base_url: String,
    /// CFF record type
    pub record_type: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        let cff = cff::CffOptions::default();
        Self {
            language: cff.language,
            citation: None,
            cff_message: cff.message,
            resource_base_url: cff.resource_base_url,
            record_type: cff.record_type,
        }
    }
}

impl ConvertOptions {
    fn cff_options(&self) -> cff::CffOptions {
        cff::CffOptions {
            language: self.language.clone(),
            message: self.cff_message.clone(),
            resource_base_url: self.resource_base_url.clone(),
            record_type: self.record_type.clone(),
        }
    }
}

/// A loaded metadata record with its declared input schema
#[derive(Debug, Clone)]
pub struct Record {
    /// Identifier of the source the record was loaded from
    pub source_id: String,
    pub schema: InputSchema,
    pub metadata: Value,
}

impl Record {
    /// Wrap an in-memory mapping.
    pub fn from_value(metadata: Value, schema: InputSchema) -> Self {
        Self {
            source_id: "<value>".to_string(),
            schema,
            metadata,
        }
    }

    /// Parse raw JSON or YAML text.
    pub fn from_text(text: &str, schema: InputSchema) -> Result<Self> {
        let metadata = SourceParser::new().parse_text(text, "<text>")?;
        Ok(Self {
            source_id: "<text>".to_string(),
            schema,
            metadata,
        })
    }

    /// Read and parse a record file with the declared encoding.
    pub fn from_path(path: &Path, schema: InputSchema, encoding: &str) -> Result<Self> {
        let metadata = SourceParser::new().parse_file(path, encoding)?;
        Ok(Self {
            source_id: path.display().to_string(),
            schema,
            metadata,
        })
    }

    /// Fetch and parse a record from an HTTP(S) URL.
    pub async fn from_url(url: &str, schema: InputSchema) -> Result<Self> {
        let response = reqwest::get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {status} response"),
            });
        }
        let text = response.text().await?;
        let metadata = SourceParser::new().parse_text(&text, url)?;
        Ok(Self {
            source_id: url.to_string(),
            schema,
            metadata,
        })
    }

    /// Load a record from any source descriptor.
    pub async fn load(source: RecordSource, schema: InputSchema, encoding: &str) -> Result<Self> {
        match source {
            RecordSource::Value(value) => Ok(Self::from_value(value, schema)),
            RecordSource::Path(path) => Self::from_path(&path, schema, encoding),
            RecordSource::Url(url) => Self::from_url(&url, schema).await,
            RecordSource::Text(text) => Self::from_text(&text, schema),
        }
    }

    /// Convert a legacy record to the canonical shape; canonical records
    /// pass through unchanged, so this is idempotent.
    pub fn normalize(mut self) -> Self {
        if self.schema == InputSchema::Firebase {
            self.metadata = normalize::firebase_to_canonical(&self.metadata);
            self.schema = InputSchema::Cioos;
        }
        self
    }

    /// Canonical-shape view of the record's metadata.
    fn canonical_metadata(&self) -> Value {
        match self.schema {
            InputSchema::Cioos => self.metadata.clone(),
            InputSchema::Firebase => normalize::firebase_to_canonical(&self.metadata),
        }
    }

    /// Convert the record to the requested output format.
    ///
    /// EML requires the legacy input shape; every other format consumes the
    /// canonical shape (normalizing on the fly when needed).
    pub fn convert_to(
        &self,
        format: OutputFormat,
        options: &ConvertOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        match format {
            OutputFormat::Json => {
                Ok(serde_json::to_string_pretty(&self.canonical_metadata())?)
            }
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&self.canonical_metadata())?),
            OutputFormat::Erddap => {
                let attributes = acdd::global_attributes(
                    &self.canonical_metadata(),
                    &options.language,
                    diagnostics,
                )?;
                Ok(acdd::to_xml(&attributes))
            }
            OutputFormat::Cff => {
                let document = cff::cff_record(
                    &self.canonical_metadata(),
                    &options.cff_options(),
                    diagnostics,
                )?;
                cff::to_yaml(&document)
            }
            OutputFormat::Eml => {
                if self.schema != InputSchema::Firebase {
                    return Err(Error::UnsupportedSchema {
                        value: self.schema.to_string(),
                        expected: "firebase".to_string(),
                    });
                }
                let citation = match &options.citation {
                    Some(citation) => citation.clone(),
                    None => {
                        generate_citation(&self.metadata, &options.language, CitationFormat::Text)
                    }
                };
                if citation.is_empty() {
                    diagnostics.info(
                        DiagnosticCode::MissingOptional,
                        "contacts",
                        "No citation could be generated",
                    );
                }
                eml::eml_xml(&self.metadata, &options.language, &citation, diagnostics)
            }
            OutputFormat::DataCiteJson => {
                datacite::to_json(&self.canonical_metadata(), diagnostics)
            }
            OutputFormat::DataCiteXml => {
                datacite::to_xml(&self.canonical_metadata(), diagnostics)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_parse() {
        assert_eq!(InputSchema::parse("CIOOS").unwrap(), InputSchema::Cioos);
        assert_eq!(InputSchema::parse("firebase").unwrap(), InputSchema::Firebase);
        let err = InputSchema::parse("dublin-core").unwrap_err();
        assert!(err.to_string().contains("CIOOS, firebase"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("erddap").unwrap(), OutputFormat::Erddap);
        assert_eq!(
            OutputFormat::parse("datacite_xml").unwrap(),
            OutputFormat::DataCiteXml
        );
        let err = OutputFormat::parse("pdf").unwrap_err();
        assert!(err.to_string().contains("Unsupported output format"));
        assert!(err.to_string().contains("erddap"));
    }

    #[test]
    fn test_deprecated_xml_aliases() {
        for alias in ["xml", "iso19115_xml", "iso19115-3_xml"] {
            assert_eq!(OutputFormat::parse(alias).unwrap(), OutputFormat::Eml);
        }
    }

    #[test]
    fn test_source_classification() {
        assert!(matches!(
            RecordSource::from_input("https://example.org/record.json"),
            RecordSource::Url(_)
        ));
        assert!(matches!(
            RecordSource::from_input("records/record.yaml"),
            RecordSource::Path(_)
        ));
        assert!(matches!(
            RecordSource::from_input("title: inline record"),
            RecordSource::Text(_)
        ));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let canonical = json!({
            "identification": {"title": {"en": "Title"}},
            "contact": [],
            "metadata": {"identifier": "abc"},
            "distribution": [],
        });
        let record = Record::from_value(canonical.clone(), InputSchema::Cioos);
        let once = record.normalize();
        assert_eq!(once.metadata, canonical);
        let twice = once.clone().normalize();
        assert_eq!(twice.metadata, once.metadata);
    }

    #[test]
    fn test_firebase_normalization_changes_schema() {
        let record = Record::from_value(
            json!({"title": "Plain", "contacts": []}),
            InputSchema::Firebase,
        );
        let normalized = record.normalize();
        assert_eq!(normalized.schema, InputSchema::Cioos);
        assert!(normalized.metadata.get("identification").is_some());
    }

    #[test]
    fn test_eml_rejects_canonical_schema() {
        let record = Record::from_value(json!({}), InputSchema::Cioos);
        let mut diagnostics = Diagnostics::new();
        let err = record
            .convert_to(OutputFormat::Eml, &ConvertOptions::default(), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedSchema { .. }));
        assert!(err.to_string().contains("firebase"));
    }

    #[test]
    fn test_json_round_trip() {
        let metadata = json!({
            "identification": {"title": {"en": "Title"}},
            "contact": [],
            "metadata": {},
            "distribution": [],
        });
        let record = Record::from_value(metadata.clone(), InputSchema::Cioos);
        let mut diagnostics = Diagnostics::new();
        let output = record
            .convert_to(OutputFormat::Json, &ConvertOptions::default(), &mut diagnostics)
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_text_parsing_sniffs_format() {
        let record = Record::from_text("{\"a\": 1}", InputSchema::Cioos).unwrap();
        assert_eq!(record.metadata["a"], 1);
        let record = Record::from_text("a: 1", InputSchema::Cioos).unwrap();
        assert_eq!(record.metadata["a"], 1);
    }
}
