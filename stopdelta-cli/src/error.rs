//! Error types emitted by the stopdelta CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use stopdelta_data::PipelineError;
use thiserror::Error;

/// Errors emitted by the stopdelta CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A provider entry is not of the form `NAME=PATH`.
    #[error("provider {spec:?} must be written as NAME=PATH")]
    InvalidProvider { spec: String },
    /// The bounding box is not four comma-separated numbers.
    #[error("bounding box {value:?} must be MIN_LON,MIN_LAT,MAX_LON,MAX_LAT")]
    InvalidBoundingBox { value: String },
    /// The clustering threshold is negative or not a number.
    #[error("threshold {value} must be a non-negative number of metres")]
    InvalidThreshold { value: f64 },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A pipeline stage failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// Some providers failed while the rest of the run completed.
    #[error("providers failed: {}", providers.join(", "))]
    ProvidersFailed { providers: Vec<String> },
    /// Writing the run summary failed.
    #[error("failed to write summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
