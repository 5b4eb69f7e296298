//! End-to-end delta runs.
//!
//! A delta run persists each provider's incoming feed, stops early when no
//! feed changed, and otherwise merges every provider into the ledger before
//! cleaning it, assigning identifiers, mirroring it to CSV and projecting the
//! name index. A provider that fails is recorded and the run moves on.
//!
//! The transfer stage is separate: it runs after the relation table has been
//! exported by hand.

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use stopdelta_core::{StationId, Territory};
use thiserror::Error;

use crate::FileError;
use crate::allocate::{AllocationError, AllocationReport, DEFAULT_BEGINNING_ID, IdentifierAllocator};
use crate::candidates::{CandidateError, ProviderFeed, read_candidates, write_extract};
use crate::change::{ChangeStatus, persist_if_changed};
use crate::dedup::{CleanReport, SpatialDeduplicator};
use crate::ledger::{MergeReport, merge_candidates};
use crate::mirror::{write_ledger_mirror, write_reference_mirror};
use crate::names::{NameDeltaReport, write_names};
use crate::reference::ReferenceBaseline;
use crate::relations::{
    InterchangeTable, RelationTable, process_relation_file, write_interchange_table,
};

/// Default distance below which two stops are treated as one.
pub const DEFAULT_THRESHOLD_METRES: f64 = 100.0;

/// Default name fragment of entries removed during cleaning.
pub const DEFAULT_EXCLUDED_NAME: &str = "flixtrain";

/// Locations of every file a run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaLayout {
    /// Directory holding the last-seen copy of each provider feed.
    pub raw_dir: Utf8PathBuf,
    /// Published reference baseline.
    pub reference: Utf8PathBuf,
    /// Coordinate ledger.
    pub ledger: Utf8PathBuf,
    /// Station name index.
    pub name_index: Utf8PathBuf,
    /// Relation table.
    pub relations: Utf8PathBuf,
    /// Interchange table.
    pub interchange: Utf8PathBuf,
    /// Directory for per-provider extracts and CSV mirrors.
    pub csv_dir: Utf8PathBuf,
}

impl DeltaLayout {
    /// Conventional layout below `raw_dir` and `delta_dir`.
    pub fn new(raw_dir: impl Into<Utf8PathBuf>, delta_dir: impl AsRef<Utf8Path>) -> Self {
        let raw_dir = raw_dir.into();
        let delta_dir = delta_dir.as_ref();
        Self {
            reference: raw_dir.join("reference_coordinates"),
            raw_dir,
            ledger: delta_dir.join("coordinates"),
            name_index: delta_dir.join("names"),
            relations: delta_dir.join("relations"),
            interchange: delta_dir.join("interchange"),
            csv_dir: delta_dir.join("csv"),
        }
    }

    /// Last-seen copy of `provider`'s feed.
    #[must_use]
    pub fn provider_feed(&self, provider: &str) -> Utf8PathBuf {
        self.raw_dir.join(provider).join("stops.txt")
    }

    /// Extract of `provider`'s stops inside the territory.
    #[must_use]
    pub fn provider_extract(&self, provider: &str) -> Utf8PathBuf {
        self.csv_dir.join(format!("{provider}_stops.csv"))
    }

    /// CSV mirror of the ledger.
    #[must_use]
    pub fn ledger_mirror(&self) -> Utf8PathBuf {
        self.csv_dir.join("coordinates.csv")
    }

    /// CSV mirror of the reference baseline.
    #[must_use]
    pub fn reference_mirror(&self) -> Utf8PathBuf {
        self.csv_dir.join("reference_coordinates.csv")
    }
}

/// Tunables of a delta run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaSettings {
    /// Lowest identifier handed to a new station.
    pub beginning_id: StationId,
    /// Spatial clustering threshold.
    pub threshold_metres: f64,
    /// Name fragment removed during cleaning.
    pub excluded_name: String,
    /// Run even when no feed changed.
    pub force: bool,
}

impl Default for DeltaSettings {
    fn default() -> Self {
        Self {
            beginning_id: DEFAULT_BEGINNING_ID,
            threshold_metres: DEFAULT_THRESHOLD_METRES,
            excluded_name: DEFAULT_EXCLUDED_NAME.to_owned(),
            force: false,
        }
    }
}

/// A provider feed and where its freshly downloaded copy lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSource {
    /// Feed description.
    pub feed: ProviderFeed,
    /// Downloaded `stops.txt`.
    pub incoming: Utf8PathBuf,
}

/// Why a provider dropped out of a run.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Reading or writing one of the provider's files failed.
    #[error(transparent)]
    File(#[from] FileError),
    /// The provider's feed could not be read.
    #[error(transparent)]
    Candidates(#[from] CandidateError),
}

/// A provider that failed during a run.
#[derive(Debug)]
pub struct ProviderFailure {
    /// Provider name.
    pub provider: String,
    /// What went wrong.
    pub error: ProviderError,
}

/// Errors that abort a delta or transfer run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The reference baseline could not be loaded.
    #[error("failed to load the reference baseline: {0}")]
    Reference(#[source] FileError),
    /// Cleaning the ledger failed.
    #[error("failed to clean the ledger: {0}")]
    Clean(#[source] FileError),
    /// Identifier allocation failed.
    #[error("failed to assign identifiers: {0}")]
    Allocation(#[from] AllocationError),
    /// Writing a CSV mirror failed.
    #[error("failed to write a CSV mirror: {0}")]
    Mirror(#[source] FileError),
    /// Processing the relation table failed.
    #[error("failed to process the relation table: {0}")]
    Relations(#[source] FileError),
    /// Writing the interchange table failed.
    #[error("failed to write the interchange table: {0}")]
    Interchange(#[source] FileError),
}

/// Outcome of [`run_delta`].
#[derive(Debug, Default)]
pub struct DeltaReport {
    /// Providers whose feed changed since the last run.
    pub changed: Vec<String>,
    /// Whether the run stopped because nothing changed.
    pub unchanged: bool,
    /// Merge result per provider.
    pub merges: Vec<(String, MergeReport)>,
    /// Cleaning result.
    pub clean: CleanReport,
    /// Allocation result.
    pub allocation: AllocationReport,
    /// Name index result per provider.
    pub names: Vec<(String, NameDeltaReport)>,
    /// Providers that failed.
    pub failures: Vec<ProviderFailure>,
}

/// Run the delta pipeline for `providers`, keeping stops inside `territory`.
pub fn run_delta(
    layout: &DeltaLayout,
    settings: &DeltaSettings,
    providers: &[ProviderSource],
    territory: &(impl Territory + ?Sized),
) -> Result<DeltaReport, PipelineError> {
    let mut report = DeltaReport::default();
    let mut active = Vec::with_capacity(providers.len());
    for source in providers {
        let name = &source.feed.name;
        match refresh_feed(layout, source) {
            Ok(status) => {
                if status.is_changed() {
                    report.changed.push(name.clone());
                }
                active.push(source);
            }
            Err(error) => record_failure(&mut report, name, error.into()),
        }
    }
    if report.changed.is_empty() && !settings.force {
        info!("No provider feed changed; skipping the delta run");
        report.unchanged = true;
        return Ok(report);
    }

    let reference = ReferenceBaseline::load(&layout.reference).map_err(PipelineError::Reference)?;
    for source in &active {
        let name = &source.feed.name;
        match merge_provider(layout, source, &reference, territory) {
            Ok(merge) => report.merges.push((name.clone(), merge)),
            Err(error) => record_failure(&mut report, name, error),
        }
    }

    report.clean = SpatialDeduplicator::new(settings.excluded_name.as_str(), settings.threshold_metres)
        .clean(&layout.ledger)
        .map_err(PipelineError::Clean)?;

    report.allocation =
        IdentifierAllocator::new(settings.beginning_id).assign_ids(&layout.ledger, reference.ids())?;

    write_ledger_mirror(&layout.ledger, &layout.ledger_mirror()).map_err(PipelineError::Mirror)?;
    write_reference_mirror(&layout.reference, &layout.reference_mirror())
        .map_err(PipelineError::Mirror)?;

    for source in &active {
        let name = &source.feed.name;
        match write_names(&layout.ledger, name, &layout.name_index) {
            Ok(names) => report.names.push((name.clone(), names)),
            Err(error) => record_failure(&mut report, name, error.into()),
        }
    }
    info!(
        "Delta run finished: {} identifiers assigned, {} provider failures",
        report.allocation.assigned.len(),
        report.failures.len()
    );
    Ok(report)
}

fn record_failure(report: &mut DeltaReport, provider: &str, error: ProviderError) {
    warn!("Provider {provider} failed: {error}");
    report.failures.push(ProviderFailure {
        provider: provider.to_owned(),
        error,
    });
}

fn refresh_feed(layout: &DeltaLayout, source: &ProviderSource) -> Result<ChangeStatus, FileError> {
    let incoming = stopdelta_fs::read_if_exists(&source.incoming)
        .map_err(|err| FileError::read(&source.incoming, err))?
        .ok_or_else(|| FileError::missing("incoming feed", &source.incoming))?;
    persist_if_changed(&layout.provider_feed(&source.feed.name), &incoming)
}

fn merge_provider(
    layout: &DeltaLayout,
    source: &ProviderSource,
    reference: &ReferenceBaseline,
    territory: &(impl Territory + ?Sized),
) -> Result<MergeReport, ProviderError> {
    let name = &source.feed.name;
    let set = read_candidates(&source.feed, &layout.provider_feed(name), territory)?;
    write_extract(&set, &layout.provider_extract(name))?;
    Ok(merge_candidates(set.candidates, reference.coords(), &layout.ledger)?)
}

/// Outcome of [`run_transfers`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Relation table after reciprocal lines were added.
    pub relations: RelationTable,
    /// Interchange table written next to it.
    pub interchange: InterchangeTable,
}

/// Process the relation export at `export` into the layout's relation
/// table, then write the interchange table. Without an export the existing
/// relation table is processed in place.
pub fn run_transfers(
    layout: &DeltaLayout,
    export: Option<&Utf8Path>,
) -> Result<TransferReport, PipelineError> {
    let input = export.unwrap_or(layout.relations.as_path());
    let relations =
        process_relation_file(input, &layout.relations).map_err(PipelineError::Relations)?;
    if relations.pairs == 0 {
        warn!("Relation table {input} holds no identifier pairs");
    }
    let interchange =
        write_interchange_table(&layout.name_index, &layout.relations, &layout.interchange)
            .map_err(PipelineError::Interchange)?;
    Ok(TransferReport {
        relations,
        interchange,
    })
}
