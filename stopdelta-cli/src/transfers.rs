//! Transfers command implementation for the stopdelta CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stopdelta_data::{
    DeltaLayout, PipelineError, TransferReport, relation_file_is_complete, run_transfers,
};

use crate::delta::{DEFAULT_DELTA_DIR, DEFAULT_RAW_DIR, require_existing};
use crate::{ARG_CHECK, ARG_DELTA_DIR, ARG_EXPORT, CliError};

/// CLI arguments for the `transfers` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Clean a relation export into the relation table, add the \
                 reciprocal of every identifier pair and write the \
                 interchange table from the name index.",
    about = "Complete the relation table and write the interchange table"
)]
#[ortho_config(prefix = "STOPDELTA")]
pub(crate) struct TransfersArgs {
    /// Relation export to process; the existing relation table when omitted.
    #[arg(value_name = "path", id = ARG_EXPORT)]
    #[serde(default)]
    pub(crate) export: Option<Utf8PathBuf>,
    /// Directory holding the delta files.
    #[arg(long = ARG_DELTA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) delta_dir: Option<Utf8PathBuf>,
    /// Only report whether every pair already has its reciprocal line.
    #[arg(long = ARG_CHECK)]
    #[serde(default)]
    pub(crate) check: bool,
}

impl TransfersArgs {
    pub(crate) fn into_config(self) -> Result<TransfersConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(TransfersConfig::from(merged))
    }
}

/// Resolved `transfers` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransfersConfig {
    pub(crate) layout: DeltaLayout,
    pub(crate) export: Option<Utf8PathBuf>,
    pub(crate) check: bool,
}

impl From<TransfersArgs> for TransfersConfig {
    fn from(args: TransfersArgs) -> Self {
        let delta_dir = args
            .delta_dir
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DELTA_DIR));
        Self {
            layout: DeltaLayout::new(DEFAULT_RAW_DIR, delta_dir),
            export: args.export,
            check: args.check,
        }
    }
}

pub(crate) fn run_transfers_command(
    args: TransfersArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    if let Some(export) = &config.export {
        require_existing(export, ARG_EXPORT)?;
    }
    if config.check {
        let relations = &config.layout.relations;
        let complete = relation_file_is_complete(relations).map_err(PipelineError::Relations)?;
        let verdict = if complete { "complete" } else { "incomplete" };
        return writeln!(writer, "Relation table {relations} is {verdict}")
            .map_err(CliError::WriteSummary);
    }
    let report = run_transfers(&config.layout, config.export.as_deref())?;
    write_summary(writer, &report).map_err(CliError::WriteSummary)
}

pub(crate) fn write_summary(writer: &mut dyn Write, report: &TransferReport) -> std::io::Result<()> {
    let relations = &report.relations;
    writeln!(
        writer,
        "Relations: {} pairs, {} reciprocal lines added, {} other lines",
        relations.pairs,
        relations.added.len(),
        relations.unpaired
    )?;
    writeln!(
        writer,
        "Interchange: {} records, {} malformed name index lines",
        report.interchange.records.len(),
        report.interchange.skipped.malformed
    )
}
