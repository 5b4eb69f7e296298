//! The coordinate ledger and the exact-duplicate merge into it.
//!
//! The ledger is a fixed-width text file with one stop per line. Lines gain
//! an identifier column during allocation; both layouts are read here.

use std::collections::HashSet;

use camino::Utf8Path;
use log::{debug, info};
use stopdelta_core::{CoordKey, LedgerEntry, ParseOutcome, SkipTally, StationId, StopCandidate};

use crate::FileError;
use crate::append::append_terminated;
use crate::format::parse_ledger_line;

/// A parsed ledger line together with its original text.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    /// The line as read, without its terminator.
    pub line: String,
    /// Parsed entry.
    pub entry: LedgerEntry,
}

/// The ledger's parseable lines in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: Vec<LedgerRecord>,
    skipped: SkipTally,
}

impl Ledger {
    /// Read the ledger at `path`, returning `None` when it does not exist.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>, FileError> {
        let contents = stopdelta_fs::read_to_string_if_exists(path)
            .map_err(|source| FileError::read(path, source))?;
        Ok(contents.as_deref().map(Self::parse))
    }

    /// Parse ledger text.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut ledger = Self::default();
        for line in contents.lines() {
            match parse_ledger_line(line) {
                ParseOutcome::Parsed(entry) => ledger.records.push(LedgerRecord {
                    line: line.to_owned(),
                    entry,
                }),
                ParseOutcome::Skipped(reason) => {
                    debug!("Skipped ledger line {line:?}: {reason}");
                    ledger.skipped.record(&reason);
                }
            }
        }
        ledger
    }

    /// Parsed lines in file order.
    #[must_use]
    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    /// Consume the ledger, yielding its records.
    #[must_use]
    pub fn into_records(self) -> Vec<LedgerRecord> {
        self.records
    }

    /// Lines that could not be parsed.
    #[must_use]
    pub fn skipped(&self) -> SkipTally {
        self.skipped
    }

    /// Coordinate keys of every entry.
    #[must_use]
    pub fn coord_keys(&self) -> HashSet<CoordKey> {
        self.records
            .iter()
            .map(|record| record.entry.coord_key())
            .collect()
    }

    /// Identifiers already assigned in the ledger.
    pub fn ids(&self) -> impl Iterator<Item = StationId> + '_ {
        self.records.iter().filter_map(|record| record.entry.id)
    }
}

/// Summary of [`merge_candidates`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Lines appended to the ledger.
    pub appended: usize,
    /// Candidates already present in the reference baseline.
    pub duplicates_in_reference: usize,
    /// Candidates already present in the ledger or earlier in the batch.
    pub duplicates_in_ledger: usize,
    /// Ledger lines that failed to parse.
    pub skipped: SkipTally,
}

/// Append every candidate whose coordinate is new to both the reference
/// baseline and the ledger at `ledger_path`.
///
/// The ledger is created when absent. Candidates are processed in order and
/// each accepted key is remembered, so a batch never appends the same
/// coordinate twice and merging the same batch again appends nothing.
pub fn merge_candidates<I>(
    candidates: I,
    reference: &HashSet<CoordKey>,
    ledger_path: &Utf8Path,
) -> Result<MergeReport, FileError>
where
    I: IntoIterator<Item = StopCandidate>,
{
    let existing = stopdelta_fs::read_to_string_if_exists(ledger_path)
        .map_err(|source| FileError::read(ledger_path, source))?
        .unwrap_or_default();
    let ledger = Ledger::parse(&existing);
    let mut seen = ledger.coord_keys();
    let mut report = MergeReport {
        skipped: ledger.skipped(),
        ..MergeReport::default()
    };

    let mut appended = Vec::new();
    for candidate in candidates {
        let entry = candidate.into_ledger_entry();
        let key = entry.coord_key();
        if reference.contains(&key) {
            debug!("{} ({key}) is already in the reference baseline", entry.name);
            report.duplicates_in_reference += 1;
        } else if !seen.insert(key.clone()) {
            debug!("{} ({key}) is already in the ledger", entry.name);
            report.duplicates_in_ledger += 1;
        } else {
            appended.push(entry.render());
        }
    }
    report.appended = appended.len();

    append_terminated(ledger_path, &existing, &appended)?;
    info!(
        "Merged into {ledger_path}: {} appended, {} in reference, {} already in ledger",
        report.appended, report.duplicates_in_reference, report.duplicates_in_ledger
    );
    Ok(report)
}
