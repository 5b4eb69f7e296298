//! First-fit identifier allocation for new ledger entries.

use std::collections::HashSet;

use camino::Utf8Path;
use log::{debug, info, warn};
use stopdelta_core::{SkipTally, StationId};
use thiserror::Error;

use crate::FileError;
use crate::ledger::Ledger;

/// Identifier handed to the first new station unless configured otherwise.
pub const DEFAULT_BEGINNING_ID: StationId = StationId::new(1_700_000);

/// Identifiers that must not be handed out again.
///
/// Rebuilt from disk on every run: the reference baseline plus every
/// identifier already written to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedIdentifiers(HashSet<StationId>);

impl UsedIdentifiers {
    /// Start from a set of identifiers.
    pub fn new(ids: impl IntoIterator<Item = StationId>) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Whether `id` is taken.
    #[must_use]
    pub fn contains(&self, id: StationId) -> bool {
        self.0.contains(&id)
    }

    /// Mark `id` as taken, returning `false` when it already was.
    pub fn insert(&mut self, id: StationId) -> bool {
        self.0.insert(id)
    }

    /// Number of identifiers taken.
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Smallest free identifier at or above `floor`.
    #[must_use]
    pub fn first_free_from(&self, floor: StationId) -> Option<StationId> {
        let mut candidate = floor;
        while self.contains(candidate) {
            candidate = candidate.checked_next()?;
        }
        Some(candidate)
    }
}

impl Extend<StationId> for UsedIdentifiers {
    fn extend<T: IntoIterator<Item = StationId>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// Errors raised by [`IdentifierAllocator::assign_ids`].
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Reading or writing the ledger failed.
    #[error(transparent)]
    File(#[from] FileError),
    /// Every identifier at or above the floor is taken.
    #[error("no free station identifier at or above {beginning_id}")]
    Exhausted {
        /// Configured floor.
        beginning_id: StationId,
    },
}

/// Summary of an allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// Identifiers assigned in this run, in ledger order.
    pub assigned: Vec<StationId>,
    /// Entries that already carried an identifier.
    pub retained: usize,
    /// Ledger lines that failed to parse and were dropped.
    pub skipped: SkipTally,
    /// Every identifier in use after the run.
    pub used: UsedIdentifiers,
}

/// Assigns identifiers to ledger entries that lack one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierAllocator {
    beginning_id: StationId,
}

impl Default for IdentifierAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_BEGINNING_ID)
    }
}

impl IdentifierAllocator {
    /// Allocate from `beginning_id` upwards.
    #[must_use]
    pub const fn new(beginning_id: StationId) -> Self {
        Self { beginning_id }
    }

    /// Give every unidentified entry of the ledger at `path` the first free
    /// identifier at or above the floor, in file order.
    ///
    /// Identified lines are written back untouched. An absent ledger is
    /// nothing to do.
    pub fn assign_ids(
        &self,
        path: &Utf8Path,
        reference_ids: &HashSet<StationId>,
    ) -> Result<AllocationReport, AllocationError> {
        let mut used = UsedIdentifiers::new(reference_ids.iter().copied());
        let Some(ledger) = Ledger::load(path)? else {
            warn!("Ledger {path} does not exist; no identifiers to assign");
            return Ok(AllocationReport {
                used,
                ..AllocationReport::default()
            });
        };
        used.extend(ledger.ids());

        let mut report = AllocationReport {
            skipped: ledger.skipped(),
            ..AllocationReport::default()
        };
        let mut cursor = self.beginning_id;
        let mut lines = Vec::with_capacity(ledger.records().len());
        for mut record in ledger.into_records() {
            if record.entry.id.is_some() {
                report.retained += 1;
                lines.push(record.line);
                continue;
            }
            let id = used.first_free_from(cursor).ok_or(AllocationError::Exhausted {
                beginning_id: self.beginning_id,
            })?;
            used.insert(id);
            debug!("Assigned {id} to {}", record.entry.name);
            record.entry.id = Some(id);
            lines.push(record.entry.render());
            report.assigned.push(id);
            cursor = id;
        }

        if !report.assigned.is_empty() || report.skipped != SkipTally::default() {
            stopdelta_fs::write_lines(path, &lines)
                .map_err(|source| FileError::write(path, source))?;
        }
        info!(
            "Assigned {} identifiers in {path}, {} entries already identified, {} in use",
            report.assigned.len(),
            report.retained,
            used.len()
        );
        report.used = used;
        Ok(report)
    }
}
