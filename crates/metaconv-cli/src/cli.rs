//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Metaconv CLI - metadata record conversion
///
/// Convert scientific-dataset metadata records to different metadata
/// formats or standards, and push their global attributes into ERDDAP
/// datasets.xml configurations.
#[derive(Parser, Debug)]
#[command(
    name = "metaconv",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective verbosity level (0 when quiet)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Whether colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert metadata records to different metadata formats or standards
    Convert(ConvertArgs),

    /// Update ERDDAP datasets.xml files with metadata records
    #[command(name = "erddap-update")]
    ErddapUpdate(ErddapUpdateArgs),
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Input file, glob pattern, or URL
    #[arg(short, long)]
    pub input: String,

    /// Process glob patterns recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Input record schema
    #[arg(long, default_value = "CIOOS", value_parser = metaconv_core::InputSchema::NAMES)]
    pub input_schema: String,

    /// Encoding of the input file
    #[arg(long, default_value = "utf-8")]
    pub encoding: String,

    /// Output directory, the original file name will be used (stdout if neither
    /// this nor --output-file is given)
    #[arg(short = 'p', long)]
    pub output_dir: Option<PathBuf>,

    /// Output file, overrides the output directory; only valid for a single
    /// input file
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long)]
    pub output_format: String,

    /// Encoding of the output file
    #[arg(long, default_value = "utf-8")]
    pub output_encoding: String,

    /// Language selected from multi-language fields
    #[arg(short, long, default_value = "en")]
    pub language: String,
}

/// Arguments for the erddap-update command
#[derive(Parser, Debug)]
pub struct ErddapUpdateArgs {
    /// ERDDAP datasets.xml file or glob (datasets.d/*.xml)
    #[arg(short, long)]
    pub datasets_xml: String,

    /// Metadata record file or glob
    #[arg(short, long)]
    pub records: String,

    /// ERDDAP base URL used to match dataset resource links
    #[arg(short = 'u', long)]
    pub erddap_url: String,

    /// Output directory (updates in place when omitted)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Input record schema
    #[arg(long, default_value = "CIOOS", value_parser = metaconv_core::InputSchema::NAMES)]
    pub input_schema: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_convert_parsing() {
        let cli = Cli::parse_from([
            "metaconv", "convert", "-i", "record.yaml", "-f", "erddap",
        ]);
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(args.input, "record.yaml");
                assert_eq!(args.output_format, "erddap");
                assert_eq!(args.input_schema, "CIOOS");
                assert_eq!(args.encoding, "utf-8");
                assert_eq!(args.language, "en");
            }
            _ => panic!("expected convert subcommand"),
        }
    }

    #[test]
    fn test_erddap_update_parsing() {
        let cli = Cli::parse_from([
            "metaconv",
            "erddap-update",
            "-d",
            "datasets.d/*.xml",
            "-r",
            "records/*.yaml",
            "-u",
            "https://example.org/erddap",
        ]);
        match cli.command {
            Commands::ErddapUpdate(args) => {
                assert_eq!(args.datasets_xml, "datasets.d/*.xml");
                assert_eq!(args.erddap_url, "https://example.org/erddap");
                assert!(args.output_dir.is_none());
            }
            _ => panic!("expected erddap-update subcommand"),
        }
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::parse_from([
            "metaconv", "-vv", "convert", "-i", "a.yaml", "-f", "json",
        ]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from([
            "metaconv", "--quiet", "convert", "-i", "a.yaml", "-f", "json",
        ]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_unknown_schema_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "metaconv", "convert", "-i", "a.yaml", "-f", "json",
            "--input-schema", "dublin-core",
        ]);
        assert!(result.is_err());
    }
}
