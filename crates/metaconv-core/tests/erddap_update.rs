//! ERDDAP datasets.xml batch update tests

use metaconv_core::erddap::{update_datasets_xml, DatasetsXml};
use metaconv_core::{Diagnostics, InputSchema, Record};
use std::fs;
use std::path::Path;

const DATASETS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<erddapDatasets>
<!-- managed by the data team -->
<dataset type="EDDTableFromNcFiles" datasetID="abc123" active="true">
    <fileDir>/data/abc123/</fileDir>
    <addAttributes>
        <att name="title">Old Title</att>
    </addAttributes>
</dataset>
</erddapDatasets>
"#;

fn fixture_record() -> Record {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/record1.yaml");
    Record::from_path(&path, InputSchema::Cioos, "utf-8").expect("fixture record loads")
}

#[test]
fn update_rewrites_matching_dataset_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let xml_path = dir.path().join("datasets.xml");
    fs::write(&xml_path, DATASETS_XML).unwrap();

    let mut diagnostics = Diagnostics::new();
    let updated = update_datasets_xml(
        &xml_path.display().to_string(),
        &[fixture_record().metadata],
        "https://catalogue.example.org/erddap",
        None,
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(updated, vec!["abc123".to_string()]);
    let content = fs::read_to_string(&xml_path).unwrap();
    assert!(content
        .contains("<att name=\"title\">Coastal water temperature observations</att>"));
    assert!(content.contains("<!-- managed by the data team -->"));
    assert!(content.contains("<fileDir>/data/abc123/</fileDir>"));
    // New attributes were appended alongside the replaced one
    assert!(content.contains("<att name=\"naming_authority\">ca.cioos</att>"));
}

#[test]
fn update_writes_to_output_directory_when_given() {
    let dir = tempfile::tempdir().unwrap();
    let xml_path = dir.path().join("datasets.xml");
    fs::write(&xml_path, DATASETS_XML).unwrap();
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();

    let mut diagnostics = Diagnostics::new();
    update_datasets_xml(
        &xml_path.display().to_string(),
        &[fixture_record().metadata],
        "https://catalogue.example.org/erddap",
        Some(&out_dir),
        &mut diagnostics,
    )
    .unwrap();

    // Original untouched, updated copy in the output directory
    assert_eq!(fs::read_to_string(&xml_path).unwrap(), DATASETS_XML);
    let copied = fs::read_to_string(out_dir.join("datasets.xml")).unwrap();
    assert!(copied.contains("Coastal water temperature observations"));
}

#[test]
fn missing_dataset_id_reports_but_does_not_fail() {
    let dir = tempfile::tempdir().unwrap();
    let xml_path = dir.path().join("datasets.xml");
    fs::write(
        &xml_path,
        DATASETS_XML.replace("datasetID=\"abc123\"", "datasetID=\"unrelated\""),
    )
    .unwrap();

    let mut diagnostics = Diagnostics::new();
    let updated = update_datasets_xml(
        &xml_path.display().to_string(),
        &[fixture_record().metadata],
        "https://catalogue.example.org/erddap",
        None,
        &mut diagnostics,
    )
    .unwrap();

    assert!(updated.is_empty());
    assert!(diagnostics.has_warnings());
    // Document content unchanged apart from the rename we made above
    let content = fs::read_to_string(&xml_path).unwrap();
    assert!(content.contains("<att name=\"title\">Old Title</att>"));
}

#[test]
fn record_without_erddap_resource_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let xml_path = dir.path().join("datasets.xml");
    fs::write(&xml_path, DATASETS_XML).unwrap();

    let mut record = fixture_record().metadata;
    record["distribution"] = serde_json::json!([
        {"url": "https://files.example.org/abc123.csv"}
    ]);

    let mut diagnostics = Diagnostics::new();
    let updated = update_datasets_xml(
        &xml_path.display().to_string(),
        &[record],
        "https://catalogue.example.org/erddap",
        None,
        &mut diagnostics,
    )
    .unwrap();
    assert!(updated.is_empty());
    assert!(diagnostics.has_warnings());
}

#[test]
fn datasets_d_glob_updates_fragment_files() {
    let dir = tempfile::tempdir().unwrap();
    let fragment_dir = dir.path().join("datasets.d");
    fs::create_dir(&fragment_dir).unwrap();
    fs::write(fragment_dir.join("abc123.xml"), DATASETS_XML).unwrap();
    fs::write(
        fragment_dir.join("other.xml"),
        DATASETS_XML.replace("datasetID=\"abc123\"", "datasetID=\"other\""),
    )
    .unwrap();

    let mut diagnostics = Diagnostics::new();
    let pattern = format!("{}/*.xml", fragment_dir.display());
    let updated = update_datasets_xml(
        &pattern,
        &[fixture_record().metadata],
        "https://catalogue.example.org/erddap",
        None,
        &mut diagnostics,
    )
    .unwrap();

    assert_eq!(updated, vec!["abc123".to_string()]);
    let updated_content = fs::read_to_string(fragment_dir.join("abc123.xml")).unwrap();
    assert!(updated_content.contains("Coastal water temperature observations"));
    let untouched = fs::read_to_string(fragment_dir.join("other.xml")).unwrap();
    assert!(untouched.contains("Old Title"));
}

#[test]
fn duplicate_dataset_id_in_one_document_fails() {
    let duplicated = format!(
        "{}\n{}",
        DATASETS_XML.trim_end().trim_end_matches("</erddapDatasets>"),
        "<dataset type=\"EDDTableFromNcFiles\" datasetID=\"abc123\">\n  <addAttributes>\n  </addAttributes>\n</dataset>\n</erddapDatasets>"
    );
    let mut document = DatasetsXml::from_string("dup.xml", duplicated);
    let mut diagnostics = Diagnostics::new();
    let attributes = serde_json::Map::from_iter([(
        "title".to_string(),
        serde_json::Value::String("X".to_string()),
    )]);
    let err = document
        .update("abc123", &attributes, &mut diagnostics)
        .unwrap_err();
    assert!(err.to_string().contains("Duplicate dataset ID"));
}
