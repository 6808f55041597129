//! Metaconv CLI - metadata record conversion
//!
//! This is the main entry point for the metaconv CLI application, providing
//! commands for converting metadata records between formats and updating
//! ERDDAP datasets.xml configurations.

mod cli;
mod error;
mod handlers;
mod logging;

use cli::{Cli, Commands};
use colored::control;
use error::Result;
use logging::LoggingConfig;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Initialize logging
    if let Err(e) = logging::init_logging(&LoggingConfig::from_verbosity(cli.verbosity_level())) {
        eprintln!("Failed to initialize logging: {e}");
    }

    // Run the application
    let result = run(cli).await;

    // Handle the result
    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
async fn run(cli: Cli) -> Result<()> {
    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Convert(args) => handlers::handle_convert(&args).await,
        Commands::ErddapUpdate(args) => handlers::handle_erddap_update(&args),
    }
}
