//! The convert command: record files/URLs to a target format

use crate::cli::ConvertArgs;
use crate::error::{Error, Result};
use metaconv_core::{
    ConvertOptions, Diagnostics, InputSchema, OutputFormat, Record, RecordSource,
};
use std::path::{Path, PathBuf};

/// Convert metadata records to the requested output format.
///
/// Per-record failures are isolated: a bad file is logged and the batch
/// continues. A nonzero number of failures surfaces as an error after the
/// batch completes.
pub async fn handle_convert(args: &ConvertArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.output_format).map_err(Error::Core)?;
    let schema = InputSchema::parse(&args.input_schema).map_err(Error::Core)?;

    tracing::info!(input = %args.input, "Loading input");
    let inputs = expand_inputs(&args.input)?;
    if inputs.is_empty() {
        return Err(Error::other(format!("No input files matched '{}'", args.input)));
    }
    if inputs.len() > 1 && args.output_file.is_some() {
        return Err(Error::invalid_args(
            "Cannot specify an output file when processing multiple files. \
             Define an output directory instead.",
        ));
    }
    tracing::debug!(count = inputs.len(), "Processing files");

    let options = ConvertOptions {
        language: args.language.clone(),
        ..ConvertOptions::default()
    };

    let mut failures = 0usize;
    for input in &inputs {
        if let Err(error) = convert_one(input, schema, format, &options, args).await {
            tracing::error!(input = %input, %error, "Conversion failed");
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(Error::other(format!(
            "{failures} of {} records failed to convert",
            inputs.len()
        )));
    }
    Ok(())
}

/// Expand a URL to itself and a path to its glob matches.
fn expand_inputs(input: &str) -> Result<Vec<String>> {
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(vec![input.to_string()]);
    }
    let mut files = Vec::new();
    for entry in glob::glob(input)? {
        match entry {
            Ok(path) => files.push(path.display().to_string()),
            Err(error) => tracing::warn!(%error, "Skipping unreadable glob entry"),
        }
    }
    Ok(files)
}

async fn convert_one(
    input: &str,
    schema: InputSchema,
    format: OutputFormat,
    options: &ConvertOptions,
    args: &ConvertArgs,
) -> Result<()> {
    tracing::debug!(input, "Processing file");
    let source = RecordSource::from_input(input);
    let is_path_source = matches!(source, RecordSource::Path(_));
    let record = Record::load(source, schema, &args.encoding).await?;

    tracing::debug!(%format, "Converting");
    let mut diagnostics = Diagnostics::new();
    let converted = record.convert_to(format, options, &mut diagnostics)?;
    if diagnostics.has_warnings() {
        tracing::warn!(
            input,
            degraded = diagnostics.len(),
            "Conversion completed with degraded fields"
        );
    }

    let output_path = resolve_output_path(input, is_path_source, format, args);
    match output_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let encoded = encode_output(&converted, &args.output_encoding)?;
            std::fs::write(&path, encoded)?;
            tracing::info!(path = %path.display(), "Wrote converted record");
        }
        None => println!("{converted}"),
    }
    Ok(())
}

/// Output file: explicit path, or `<output-dir>/<stem>.<ext>` for path
/// sources, else stdout.
fn resolve_output_path(
    input: &str,
    is_path_source: bool,
    format: OutputFormat,
    args: &ConvertArgs,
) -> Option<PathBuf> {
    if let Some(file) = &args.output_file {
        return Some(file.clone());
    }
    let dir = args.output_dir.as_ref()?;
    if !is_path_source {
        return None;
    }
    let stem = Path::new(input).file_stem()?.to_string_lossy().to_string();
    Some(dir.join(format!("{stem}.{}", format.extension())))
}

/// Encode output text under the declared output encoding.
fn encode_output(text: &str, encoding: &str) -> Result<Vec<u8>> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(text.as_bytes().to_vec()),
        "latin-1" | "latin1" | "iso-8859-1" => text
            .chars()
            .map(|c| {
                u8::try_from(c as u32).map_err(|_| {
                    Error::other(format!("Character '{c}' is not representable in latin-1"))
                })
            })
            .collect(),
        _ => Err(Error::other(format!("Unknown output encoding '{encoding}'"))),
    }
}
