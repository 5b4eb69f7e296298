//! Loading the published reference baseline.

use std::collections::HashSet;

use camino::Utf8Path;
use log::{debug, info};
use stopdelta_core::{CoordKey, ParseOutcome, SkipTally, StationId};

use crate::FileError;
use crate::format::{parse_leading_id, parse_reference_line};

/// Coordinates and identifiers already handed out by the reference data set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceBaseline {
    coords: HashSet<CoordKey>,
    ids: HashSet<StationId>,
    skipped: SkipTally,
}

impl ReferenceBaseline {
    /// Read the baseline at `path`. The file is required.
    pub fn load(path: &Utf8Path) -> Result<Self, FileError> {
        let contents = stopdelta_fs::read_to_string_if_exists(path)
            .map_err(|source| FileError::read(path, source))?
            .ok_or_else(|| FileError::missing("reference baseline", path))?;
        let baseline = Self::from_lines(contents.lines());
        info!(
            "Loaded reference baseline {path}: {} coordinates, {} identifiers, {} malformed lines",
            baseline.coords.len(),
            baseline.ids.len(),
            baseline.skipped.malformed
        );
        Ok(baseline)
    }

    /// Build a baseline from reference lines.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut baseline = Self::default();
        for line in lines {
            if let Some(id) = parse_leading_id(line) {
                baseline.ids.insert(id);
            }
            match parse_reference_line(line) {
                ParseOutcome::Parsed(entry) => {
                    baseline.coords.insert(entry.coord_key());
                }
                ParseOutcome::Skipped(reason) => {
                    debug!("Skipped reference line {line:?}: {reason}");
                    baseline.skipped.record(&reason);
                }
            }
        }
        baseline
    }

    /// Coordinate keys of every published stop.
    #[must_use]
    pub fn coords(&self) -> &HashSet<CoordKey> {
        &self.coords
    }

    /// Identifiers used by the baseline.
    #[must_use]
    pub fn ids(&self) -> &HashSet<StationId> {
        &self.ids
    }

    /// Lines that could not be parsed.
    #[must_use]
    pub fn skipped(&self) -> SkipTally {
        self.skipped
    }
}
