//! Stop records flowing through the delta pipeline.
//!
//! A [`StopCandidate`] comes from a provider feed, becomes a [`LedgerEntry`]
//! once merged, gains a [`StationId`] during allocation and is finally
//! projected into a [`NameIndexEntry`].

use std::fmt;

use geo::Coord;

use crate::coord::{CoordKey, fixed_columns, snap_to_file_grid};
use crate::identifier::StationId;

/// Separator between the coordinate columns and the name segment.
pub const NAME_SEPARATOR: char = '%';

/// Suffix terminating every name index line.
pub const NAME_INDEX_SUFFIX: &str = "$<1>";

/// Blank columns between the latitude and the name separator of identified
/// ledger lines.
const IDENTIFIED_GAP: &str = "         ";

/// A stop discovered in a provider feed.
///
/// # Examples
/// ```
/// use stopdelta_core::StopCandidate;
///
/// let stop = StopCandidate::new("Flixbus", "Bern", 7.44, 46.95);
/// assert_eq!(stop.coord_key().as_str(), "46.95000000,7.44000000");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StopCandidate {
    /// Provider the stop was read from.
    pub provider: String,
    /// Human readable stop name.
    pub name: String,
    /// Position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
}

impl StopCandidate {
    /// Construct a candidate from its parts.
    pub fn new(provider: impl Into<String>, name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
            location: Coord { x: lon, y: lat },
        }
    }

    /// Exact-match key of the candidate's coordinate.
    #[must_use]
    pub fn coord_key(&self) -> CoordKey {
        CoordKey::from_coord(self.location)
    }

    /// Convert into a ledger entry awaiting an identifier.
    ///
    /// The location is snapped to the file precision.
    #[must_use]
    pub fn into_ledger_entry(self) -> LedgerEntry {
        LedgerEntry {
            id: None,
            location: snap_to_file_grid(self.location),
            name: self.name,
            provider: Some(self.provider),
        }
    }
}

/// One line of the coordinate ledger.
///
/// `provider` is parsed from a trailing `[provider]` tag in the name segment;
/// the tag is rendered back verbatim, so lines keep their provenance after an
/// identifier has been assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Identifier, absent until allocation.
    pub id: Option<StationId>,
    /// Position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
    /// Stop name without the provider tag.
    pub name: String,
    /// Provider tag, if the line carried one.
    pub provider: Option<String>,
}

impl LedgerEntry {
    /// Exact-match key of the entry's coordinate.
    #[must_use]
    pub fn coord_key(&self) -> CoordKey {
        CoordKey::from_coord(self.location)
    }

    /// The name segment as written after the `%` separator.
    #[must_use]
    pub fn name_segment(&self) -> String {
        match &self.provider {
            Some(provider) => format!("{} [{provider}]", self.name),
            None => self.name.clone(),
        }
    }

    /// Render the entry as a ledger line, with or without identifier.
    ///
    /// # Examples
    /// ```
    /// use stopdelta_core::{LedgerEntry, StationId, StopCandidate};
    ///
    /// let mut entry = StopCandidate::new("TestCo", "TestStop", 12.3456, 47.1234)
    ///     .into_ledger_entry();
    /// assert_eq!(entry.render(), "  12.345600  47.123400    % TestStop [TestCo]");
    ///
    /// entry.id = Some(StationId::new(1_700_000));
    /// assert_eq!(
    ///     entry.render(),
    ///     "1700000   12.345600  47.123400         % TestStop [TestCo]"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let columns = fixed_columns(self.location);
        let segment = self.name_segment();
        match self.id {
            Some(id) => format!("{id:<8}{columns}{IDENTIFIED_GAP}{NAME_SEPARATOR} {segment}"),
            None => format!("{columns}    {NAME_SEPARATOR} {segment}"),
        }
    }
}

/// An entry of the published reference baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    /// Published identifier.
    pub id: StationId,
    /// Position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
    /// Name segment following `%`, empty when absent.
    pub name: String,
}

impl ReferenceEntry {
    /// Exact-match key of the entry's coordinate.
    #[must_use]
    pub fn coord_key(&self) -> CoordKey {
        CoordKey::from_coord(self.location)
    }
}

/// A line of the station name index.
///
/// # Examples
/// ```
/// use stopdelta_core::{NameIndexEntry, StationId};
///
/// let entry = NameIndexEntry::new(StationId::new(1_700_000), "TestStop");
/// assert_eq!(entry.to_string(), "1700000      TestStop$<1>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameIndexEntry {
    /// Station identifier.
    pub id: StationId,
    /// Station name.
    pub name: String,
}

impl NameIndexEntry {
    /// Construct an entry.
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for NameIndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8}     {}{NAME_INDEX_SUFFIX}", self.id, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn untagged_entries_render_bare_name() {
        let entry = LedgerEntry {
            id: Some(StationId::new(1_700_001)),
            location: Coord { x: 8.0, y: 47.0 },
            name: "Zurich HB".into(),
            provider: None,
        };
        assert_eq!(
            entry.render(),
            "1700001    8.000000  47.000000         % Zurich HB"
        );
    }

    #[rstest]
    fn candidates_keep_provider_when_entering_ledger() {
        let entry = StopCandidate::new("BlaBlaCar", "Basel", 7.59, 47.55).into_ledger_entry();
        assert_eq!(entry.provider.as_deref(), Some("BlaBlaCar"));
        assert_eq!(entry.id, None);
        assert_eq!(entry.name_segment(), "Basel [BlaBlaCar]");
    }
}
