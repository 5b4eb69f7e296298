//! Spatial clean-up of the coordinate ledger.
//!
//! Cleaning runs in two passes over the ledger in file order:
//!
//! 1. entries whose name segment contains the excluded substring are
//!    dropped (case-insensitive);
//! 2. the remaining entries are clustered greedily: an entry closer than the
//!    threshold to any entry kept so far is dropped as a duplicate of the
//!    nearest kept entry.
//!
//! The first entry of a cluster always wins, so results depend on file order.

use camino::Utf8Path;
use log::{debug, info, warn};
use stopdelta_core::{SkipTally, haversine_distance};

use crate::FileError;
use crate::ledger::{Ledger, LedgerRecord};

/// Near duplicates shown in summaries.
pub const NEAR_DUPLICATE_SAMPLE: usize = 10;

/// An entry removed because it lies within the threshold of a kept entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NearDuplicate {
    /// Name of the removed entry.
    pub name: String,
    /// Distance to the kept entry in metres.
    pub distance_metres: f64,
    /// Name of the kept entry it collapsed into.
    pub kept_name: String,
}

/// Summary of [`SpatialDeduplicator::clean`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    /// Names of entries removed by the excluded substring.
    pub removed_excluded: Vec<String>,
    /// Entries removed as near duplicates.
    pub removed_near: Vec<NearDuplicate>,
    /// Entries left in the ledger.
    pub kept: usize,
    /// Ledger lines that failed to parse and were dropped.
    pub skipped: SkipTally,
}

impl CleanReport {
    /// Up to [`NEAR_DUPLICATE_SAMPLE`] near duplicates for display.
    #[must_use]
    pub fn near_duplicate_sample(&self) -> impl Iterator<Item = &NearDuplicate> {
        self.removed_near.iter().take(NEAR_DUPLICATE_SAMPLE)
    }

    /// Whether the ledger was rewritten.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.removed_excluded.is_empty()
            || !self.removed_near.is_empty()
            || self.skipped != SkipTally::default()
    }
}

/// Removes excluded and near-duplicate entries from the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialDeduplicator {
    excluded_name: String,
    threshold_metres: f64,
}

impl SpatialDeduplicator {
    /// Build a deduplicator. An empty `excluded_name` excludes nothing.
    pub fn new(excluded_name: impl Into<String>, threshold_metres: f64) -> Self {
        Self {
            excluded_name: excluded_name.into().to_lowercase(),
            threshold_metres,
        }
    }

    fn is_excluded(&self, record: &LedgerRecord) -> bool {
        !self.excluded_name.is_empty()
            && record
                .entry
                .name_segment()
                .to_lowercase()
                .contains(&self.excluded_name)
    }

    /// Clean the ledger at `path` in place.
    ///
    /// An absent ledger is left alone. Kept lines are written back verbatim.
    pub fn clean(&self, path: &Utf8Path) -> Result<CleanReport, FileError> {
        let Some(ledger) = Ledger::load(path)? else {
            warn!("Ledger {path} does not exist; nothing to clean");
            return Ok(CleanReport::default());
        };
        let skipped = ledger.skipped();
        let (kept, mut report) = self.clean_records(ledger.into_records());
        report.skipped = skipped;

        if report.changed() {
            stopdelta_fs::write_lines(path, kept.iter().map(|record| record.line.trim_end()))
                .map_err(|source| FileError::write(path, source))?;
        }
        info!(
            "Cleaned {path}: {} excluded, {} near duplicates within {} m, {} kept",
            report.removed_excluded.len(),
            report.removed_near.len(),
            self.threshold_metres,
            report.kept
        );
        for duplicate in report.near_duplicate_sample() {
            info!(
                "  {} is {:.1} m from {}",
                duplicate.name, duplicate.distance_metres, duplicate.kept_name
            );
        }
        Ok(report)
    }

    fn clean_records(&self, records: Vec<LedgerRecord>) -> (Vec<LedgerRecord>, CleanReport) {
        let mut report = CleanReport::default();
        let mut kept: Vec<LedgerRecord> = Vec::new();
        for record in records {
            if self.is_excluded(&record) {
                debug!("Excluded {}", record.entry.name_segment());
                report.removed_excluded.push(record.entry.name);
                continue;
            }
            match nearest(&kept, &record) {
                Some((distance, closest)) if distance < self.threshold_metres => {
                    debug!(
                        "{} is {distance:.1} m from {}",
                        record.entry.name, closest.entry.name
                    );
                    report.removed_near.push(NearDuplicate {
                        name: record.entry.name,
                        distance_metres: distance,
                        kept_name: closest.entry.name.clone(),
                    });
                }
                _ => kept.push(record),
            }
        }
        report.kept = kept.len();
        (kept, report)
    }
}

fn nearest<'a>(kept: &'a [LedgerRecord], record: &LedgerRecord) -> Option<(f64, &'a LedgerRecord)> {
    kept.iter()
        .map(|other| {
            (
                haversine_distance(other.entry.location, record.entry.location),
                other,
            )
        })
        .min_by(|(left, _), (right, _)| left.total_cmp(right))
}
