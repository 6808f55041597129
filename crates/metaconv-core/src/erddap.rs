//! ERDDAP datasets.xml update
//!
//! Upserts `<addAttributes><att name="…">` elements under a matching
//! `<dataset datasetID="…">` in existing ERDDAP configuration files. The
//! rewrite is event-based: every event outside the matched dataset's
//! attribute block — comments included — is echoed verbatim, so unrelated
//! document content survives byte-for-byte.

use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{Error, Result};
use crate::mappers::acdd;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// One ERDDAP datasets.xml (or datasets.d fragment) held in memory
#[derive(Debug, Clone)]
pub struct DatasetsXml {
    path: PathBuf,
    content: String,
}

impl DatasetsXml {
    /// Read a datasets.xml file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Build from in-memory content (used by tests).
    pub fn from_string(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn attribute_value(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
        let attribute = element
            .try_get_attribute(name)
            .map_err(|e| Error::parse("datasets.xml", e.to_string()))?;
        match attribute {
            Some(attribute) => {
                let value = attribute
                    .unescape_value()
                    .map_err(|e| Error::parse("datasets.xml", e.to_string()))?;
                Ok(Some(value.into_owned()))
            }
            None => Ok(None),
        }
    }

    /// Count `<dataset>` elements carrying the given datasetID.
    fn count_dataset_id(&self, dataset_id: &str) -> Result<usize> {
        let mut reader = Reader::from_str(&self.content);
        let mut count = 0;
        loop {
            match reader.read_event().map_err(Error::Xml)? {
                Event::Start(element) | Event::Empty(element)
                    if element.name().as_ref() == b"dataset" =>
                {
                    if Self::attribute_value(&element, "datasetID")?.as_deref()
                        == Some(dataset_id)
                    {
                        count += 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(count)
    }

    /// True when the document contains the dataset ID.
    pub fn has_dataset_id(&self, dataset_id: &str) -> Result<bool> {
        Ok(self.count_dataset_id(dataset_id)? > 0)
    }

    /// Upsert attributes into the matched dataset's first `<addAttributes>`
    /// block. Returns false when the dataset ID is absent; a duplicate ID
    /// is a hard failure.
    pub fn update(
        &mut self,
        dataset_id: &str,
        attributes: &Map<String, Value>,
        diagnostics: &mut Diagnostics,
    ) -> Result<bool> {
        match self.count_dataset_id(dataset_id)? {
            0 => return Ok(false),
            1 => {}
            _ => {
                return Err(Error::DuplicateDatasetId {
                    dataset_id: dataset_id.to_string(),
                    path: self.path.clone(),
                })
            }
        }

        let mut reader = Reader::from_str(&self.content);
        let mut writer = Writer::new(Vec::new());

        // Position within the matched dataset element
        let mut in_target = false;
        let mut target_depth = 0usize;
        let mut adds_handled = false;
        let mut in_adds = false;
        let mut skipping_att = false;
        let mut updated_keys: Vec<String> = Vec::new();

        loop {
            let event = reader.read_event().map_err(Error::Xml)?;
            match event {
                Event::Eof => break,
                Event::Start(ref element) => {
                    if skipping_att {
                        continue;
                    }
                    let is_dataset = element.name().as_ref() == b"dataset";
                    let is_adds = element.name().as_ref() == b"addAttributes";
                    let is_att = element.name().as_ref() == b"att";
                    if !in_target
                        && is_dataset
                        && Self::attribute_value(element, "datasetID")?.as_deref()
                            == Some(dataset_id)
                    {
                        in_target = true;
                        target_depth = 0;
                        writer.write_event(event)?;
                        continue;
                    }
                    if in_target {
                        target_depth += 1;
                        if is_adds && !adds_handled && !in_adds {
                            in_adds = true;
                            writer.write_event(event)?;
                            continue;
                        }
                        if in_adds && is_att {
                            if let Some(att_name) = Self::attribute_value(element, "name")? {
                                if let Some(value) = attributes.get(&att_name) {
                                    tracing::debug!(att = %att_name, "Updating attribute");
                                    writer.write_event(Event::Start(element.to_owned()))?;
                                    writer.write_event(Event::Text(BytesText::new(
                                        &acdd::att_text(value),
                                    )))?;
                                    writer.write_event(Event::End(BytesEnd::new("att")))?;
                                    updated_keys.push(att_name);
                                    skipping_att = true;
                                    target_depth -= 1; // End(att) will be skipped too
                                    continue;
                                }
                            }
                        }
                    }
                    writer.write_event(event)?;
                }
                Event::End(ref element) => {
                    let is_att = element.name().as_ref() == b"att";
                    let is_adds = element.name().as_ref() == b"addAttributes";
                    if skipping_att {
                        if is_att {
                            skipping_att = false;
                        }
                        continue;
                    }
                    if in_target {
                        if in_adds && is_adds {
                            // Append attributes the block did not already have
                            for (key, value) in attributes {
                                if updated_keys.iter().any(|k| k == key) {
                                    continue;
                                }
                                tracing::debug!(att = %key, "Adding new attribute");
                                let mut att = BytesStart::new("att");
                                att.push_attribute(("name", key.as_str()));
                                writer.write_event(Event::Start(att))?;
                                writer.write_event(Event::Text(BytesText::new(
                                    &acdd::att_text(value),
                                )))?;
                                writer.write_event(Event::End(BytesEnd::new("att")))?;
                            }
                            in_adds = false;
                            adds_handled = true;
                        }
                        if target_depth == 0 {
                            // Closing the matched dataset element itself
                            if !adds_handled {
                                diagnostics.warn(
                                    DiagnosticCode::InvalidShape,
                                    "datasets.xml",
                                    format!(
                                        "Dataset '{dataset_id}' has no addAttributes block"
                                    ),
                                );
                            }
                            in_target = false;
                        } else {
                            target_depth -= 1;
                        }
                    }
                    writer.write_event(event)?;
                }
                Event::Empty(ref element) => {
                    if skipping_att {
                        continue;
                    }
                    // Self-closing <att name="…"/> entries are replaced like
                    // populated ones
                    if in_target && in_adds && element.name().as_ref() == b"att" {
                        if let Some(att_name) = Self::attribute_value(element, "name")? {
                            if let Some(value) = attributes.get(&att_name) {
                                let mut att = BytesStart::new("att");
                                att.push_attribute(("name", att_name.as_str()));
                                writer.write_event(Event::Start(att))?;
                                writer.write_event(Event::Text(BytesText::new(
                                    &acdd::att_text(value),
                                )))?;
                                writer.write_event(Event::End(BytesEnd::new("att")))?;
                                updated_keys.push(att_name);
                                continue;
                            }
                        }
                    }
                    writer.write_event(event)?;
                }
                other => {
                    if !skipping_att {
                        writer.write_event(other)?;
                    }
                }
            }
        }

        self.content = String::from_utf8(writer.into_inner())
            .map_err(|e| Error::parse(self.path.display().to_string(), e.to_string()))?;
        Ok(true)
    }

    /// Write the document back, to the original path or an override.
    pub fn save(&self, output: Option<&Path>) -> Result<PathBuf> {
        let target = output.unwrap_or(&self.path).to_path_buf();
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&target, &self.content)?;
        Ok(target)
    }
}

/// Derive the ERDDAP dataset ID from a record's distribution list: the last
/// path segment (minus `.html`) of the first resource URL under the ERDDAP
/// base URL.
pub fn dataset_id_from_record(record: &Value, erddap_url: &str) -> Option<String> {
    let distribution = record.get("distribution")?.as_array()?;
    for resource in distribution {
        let Some(raw_url) = resource.get("url").and_then(Value::as_str) else {
            continue;
        };
        if !raw_url.contains(erddap_url) {
            continue;
        }
        let Ok(parsed) = url::Url::parse(raw_url) else {
            tracing::warn!(url = raw_url, "Skipping unparseable resource URL");
            continue;
        };
        let Some(last_segment) = parsed.path_segments().and_then(|mut s| s.next_back()) else {
            continue;
        };
        let dataset_id = last_segment.strip_suffix(".html").unwrap_or(last_segment);
        if !dataset_id.is_empty() {
            return Some(dataset_id.to_string());
        }
    }
    None
}

/// Update a set of ERDDAP datasets.xml files with the global attributes of
/// a set of canonical records.
///
/// Per-record mapping failures are isolated: the record is skipped with a
/// diagnostic and the batch continues. Returns the dataset IDs that were
/// updated; never-matched IDs degrade with a warning.
pub fn update_datasets_xml(
    datasets_glob: &str,
    records: &[Value],
    erddap_url: &str,
    output_dir: Option<&Path>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<String>> {
    let files: Vec<PathBuf> = glob::glob(datasets_glob)
        .map_err(|e| Error::parse(datasets_glob, e.to_string()))?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::warn!(%error, "Skipping unreadable glob entry");
                None
            }
        })
        .collect();
    if files.is_empty() {
        return Err(Error::parse(
            datasets_glob,
            "no datasets.xml files matched",
        ));
    }

    let mut targets: Vec<(String, Map<String, Value>)> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let Some(dataset_id) = dataset_id_from_record(record, erddap_url) else {
            diagnostics.warn(
                DiagnosticCode::SkippedResource,
                &format!("records[{index}].distribution"),
                format!("No resource URL under '{erddap_url}', skipping record"),
            );
            continue;
        };
        match acdd::global_attributes(record, "en", diagnostics) {
            Ok(attributes) => targets.push((dataset_id, attributes)),
            Err(error) => diagnostics.error(
                DiagnosticCode::InvalidShape,
                &format!("records[{index}]"),
                format!("Failed to map record for dataset '{dataset_id}': {error}"),
            ),
        }
    }

    let mut updated: Vec<String> = Vec::new();
    for file in &files {
        let mut document = DatasetsXml::read(file)?;
        let mut changed = false;
        for (dataset_id, attributes) in &targets {
            if document.update(dataset_id, attributes, diagnostics)? {
                updated.push(dataset_id.clone());
                changed = true;
            }
        }
        let output = output_dir.map(|dir| {
            dir.join(
                file.file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| file.clone()),
            )
        });
        let written = document.save(output.as_deref())?;
        tracing::debug!(path = %written.display(), changed, "Wrote datasets.xml");
    }

    for (dataset_id, _) in &targets {
        if !updated.contains(dataset_id) {
            diagnostics.warn(
                DiagnosticCode::MissingOptional,
                "datasets.xml",
                format!("Dataset ID '{dataset_id}' not found in {datasets_glob}"),
            );
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DATASETS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<erddapDatasets>
<!-- leading comment -->
<dataset type="EDDTableFromNcFiles" datasetID="abc123" active="true">
    <fileDir>/data/abc123/</fileDir>
    <addAttributes>
        <att name="title">Old Title</att>
        <att name="institution">Old Institution</att>
    </addAttributes>
</dataset>
<dataset type="EDDTableFromNcFiles" datasetID="other" active="true">
    <addAttributes>
        <att name="title">Other Title</att>
    </addAttributes>
</dataset>
<!-- trailing comment -->
</erddapDatasets>
"#;

    fn attributes(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_update_existing_attribute() {
        let mut document = DatasetsXml::from_string("test.xml", DATASETS_XML);
        let mut diagnostics = Diagnostics::new();
        let updated = document
            .update(
                "abc123",
                &attributes(&[("title", "New Title")]),
                &mut diagnostics,
            )
            .unwrap();
        assert!(updated);
        assert!(document.content().contains("<att name=\"title\">New Title</att>"));
        // Sibling attribute, comments, and the other dataset are untouched
        assert!(document
            .content()
            .contains("<att name=\"institution\">Old Institution</att>"));
        assert!(document.content().contains("<!-- leading comment -->"));
        assert!(document.content().contains("<!-- trailing comment -->"));
        assert!(document.content().contains("Other Title"));
        assert!(document.content().contains("<fileDir>/data/abc123/</fileDir>"));
    }

    #[test]
    fn test_insert_new_attribute() {
        let mut document = DatasetsXml::from_string("test.xml", DATASETS_XML);
        let mut diagnostics = Diagnostics::new();
        document
            .update(
                "abc123",
                &attributes(&[("summary", "A new summary")]),
                &mut diagnostics,
            )
            .unwrap();
        assert!(document
            .content()
            .contains("<att name=\"summary\">A new summary</att>"));
        assert!(document.content().contains("<att name=\"title\">Old Title</att>"));
    }

    #[test]
    fn test_missing_dataset_id_leaves_document_unchanged() {
        let mut document = DatasetsXml::from_string("test.xml", DATASETS_XML);
        let mut diagnostics = Diagnostics::new();
        let updated = document
            .update(
                "does-not-exist",
                &attributes(&[("title", "X")]),
                &mut diagnostics,
            )
            .unwrap();
        assert!(!updated);
        assert_eq!(document.content(), DATASETS_XML);
    }

    #[test]
    fn test_duplicate_dataset_id_is_fatal() {
        let duplicated = DATASETS_XML.replace("datasetID=\"other\"", "datasetID=\"abc123\"");
        let mut document = DatasetsXml::from_string("test.xml", duplicated);
        let mut diagnostics = Diagnostics::new();
        let err = document
            .update("abc123", &attributes(&[("title", "X")]), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateDatasetId { .. }));
    }

    #[test]
    fn test_only_matched_dataset_updated() {
        let mut document = DatasetsXml::from_string("test.xml", DATASETS_XML);
        let mut diagnostics = Diagnostics::new();
        document
            .update(
                "other",
                &attributes(&[("title", "Changed")]),
                &mut diagnostics,
            )
            .unwrap();
        assert!(document.content().contains("<att name=\"title\">Old Title</att>"));
        assert!(document.content().contains("<att name=\"title\">Changed</att>"));
    }

    #[test]
    fn test_attribute_text_is_escaped() {
        let mut document = DatasetsXml::from_string("test.xml", DATASETS_XML);
        let mut diagnostics = Diagnostics::new();
        document
            .update(
                "abc123",
                &attributes(&[("title", "Fish & Ships <deluxe>")]),
                &mut diagnostics,
            )
            .unwrap();
        assert!(document
            .content()
            .contains("<att name=\"title\">Fish &amp; Ships &lt;deluxe&gt;</att>"));
    }

    #[test]
    fn test_dataset_id_from_record() {
        let record = json!({
            "distribution": [
                {"url": "https://example.org/portal/abc"},
                {"url": "https://catalogue.example.org/erddap/tabledap/abc123.html"},
            ]
        });
        assert_eq!(
            dataset_id_from_record(&record, "https://catalogue.example.org/erddap").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            dataset_id_from_record(&record, "https://other-server.example.org/erddap"),
            None
        );
    }

    #[test]
    fn test_has_dataset_id() {
        let document = DatasetsXml::from_string("test.xml", DATASETS_XML);
        assert!(document.has_dataset_id("abc123").unwrap());
        assert!(!document.has_dataset_id("zzz").unwrap());
    }
}
