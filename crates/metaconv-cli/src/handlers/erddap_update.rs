//! The erddap-update command: push record attributes into datasets.xml

use crate::cli::ErddapUpdateArgs;
use crate::error::{Error, Result};
use metaconv_core::erddap::update_datasets_xml;
use metaconv_core::{Diagnostics, InputSchema, Record};
use serde_json::Value;

/// Update ERDDAP datasets.xml files with the global attributes of the
/// matched metadata records.
pub fn handle_erddap_update(args: &ErddapUpdateArgs) -> Result<()> {
    let schema = InputSchema::parse(&args.input_schema).map_err(Error::Core)?;
    let records = load_records(&args.records, schema)?;
    if records.is_empty() {
        return Err(Error::other(format!(
            "No record files matched '{}'",
            args.records
        )));
    }
    tracing::info!(count = records.len(), "Loaded metadata records");

    let mut diagnostics = Diagnostics::new();
    let updated = update_datasets_xml(
        &args.datasets_xml,
        &records,
        &args.erddap_url,
        args.output_dir.as_deref(),
        &mut diagnostics,
    )?;

    if diagnostics.has_warnings() {
        tracing::warn!(
            degraded = diagnostics.len(),
            "Update completed with degraded fields or unmatched datasets"
        );
    }
    println!("Updated {} dataset(s): {}", updated.len(), updated.join(", "));
    Ok(())
}

/// Load every record matching the glob, normalized to canonical shape.
/// Unreadable records are logged and skipped.
fn load_records(pattern: &str, schema: InputSchema) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(error) => {
                tracing::warn!(%error, "Skipping unreadable glob entry");
                continue;
            }
        };
        match Record::from_path(&path, schema, "utf-8") {
            Ok(record) => records.push(record.normalize().metadata),
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "Skipping record");
            }
        }
    }
    Ok(records)
}
