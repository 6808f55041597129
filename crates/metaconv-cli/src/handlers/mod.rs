//! Subcommand handlers

mod convert;
mod erddap_update;

pub use convert::handle_convert;
pub use erddap_update::handle_erddap_update;
