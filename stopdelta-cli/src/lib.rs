//! Command-line interface for the stop delta tooling.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod delta;
mod error;
mod transfers;

pub use error::CliError;

use delta::{DeltaArgs, run_delta_command};
use transfers::{TransfersArgs, run_transfers_command};

pub(crate) const ARG_RAW_DIR: &str = "raw-dir";
pub(crate) const ARG_DELTA_DIR: &str = "delta-dir";
pub(crate) const ARG_REFERENCE: &str = "reference";
pub(crate) const ARG_PROVIDERS: &str = "providers";
pub(crate) const ARG_BEGINNING_ID: &str = "beginning-id";
pub(crate) const ARG_THRESHOLD_METRES: &str = "threshold-metres";
pub(crate) const ARG_EXCLUDED_NAME: &str = "excluded-name";
pub(crate) const ARG_LAT_COLUMN: &str = "lat-column";
pub(crate) const ARG_LON_COLUMN: &str = "lon-column";
pub(crate) const ARG_NAME_COLUMN: &str = "name-column";
pub(crate) const ARG_BBOX: &str = "bbox";
pub(crate) const ARG_FORCE: &str = "force";
pub(crate) const ARG_EXPORT: &str = "export";
pub(crate) const ARG_CHECK: &str = "check";
pub(crate) const ENV_PROVIDERS: &str = "STOPDELTA_CMDS_DELTA_PROVIDERS";

/// Run the CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Delta(args) => run_delta_command(args, &mut stdout),
        Command::Transfers(args) => run_transfers_command(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "stopdelta",
    about = "Merge provider stops into the station delta files",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge changed provider feeds into the ledger and name index.
    Delta(DeltaArgs),
    /// Add reciprocal relation lines and write the interchange table.
    Transfers(TransfersArgs),
}

#[cfg(test)]
mod tests;
