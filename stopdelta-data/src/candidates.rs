//! Reading provider stop feeds and restricting them to the managed territory.
//!
//! Feeds are GTFS `stops.txt` files. Column names differ between providers,
//! so each [`ProviderFeed`] names the columns holding latitude, longitude and
//! the stop name.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::Serialize;
use stopdelta_core::{StopCandidate, Territory};
use thiserror::Error;

use crate::FileError;

/// Default GTFS latitude column.
pub const DEFAULT_LAT_COLUMN: &str = "stop_lat";
/// Default GTFS longitude column.
pub const DEFAULT_LON_COLUMN: &str = "stop_lon";
/// Default GTFS stop name column.
pub const DEFAULT_NAME_COLUMN: &str = "stop_name";

/// Description of one provider's stop feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFeed {
    /// Provider tag written into the ledger.
    pub name: String,
    /// Latitude column header.
    pub lat_column: String,
    /// Longitude column header.
    pub lon_column: String,
    /// Stop name column header.
    pub name_column: String,
}

impl ProviderFeed {
    /// A feed using the standard GTFS column names.
    pub fn gtfs(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat_column: DEFAULT_LAT_COLUMN.to_owned(),
            lon_column: DEFAULT_LON_COLUMN.to_owned(),
            name_column: DEFAULT_NAME_COLUMN.to_owned(),
        }
    }

    /// Override the coordinate column names.
    #[must_use]
    pub fn with_coordinate_columns(
        mut self,
        lat_column: impl Into<String>,
        lon_column: impl Into<String>,
    ) -> Self {
        self.lat_column = lat_column.into();
        self.lon_column = lon_column.into();
        self
    }
}

/// Stops of one provider that lie inside the territory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    /// Accepted candidates in feed order.
    pub candidates: Vec<StopCandidate>,
    /// Rows outside the territory.
    pub outside: usize,
    /// Rows whose coordinates failed to parse.
    pub malformed: usize,
}

/// Errors raised while reading a provider feed.
#[derive(Debug, Error)]
pub enum CandidateError {
    /// The feed file could not be read.
    #[error(transparent)]
    File(#[from] FileError),
    /// The feed is not valid CSV.
    #[error("failed to parse stop feed {path:?}: {source}")]
    Csv {
        /// Feed location.
        path: Utf8PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// A configured column is absent from the header row.
    #[error("stop feed {path:?} has no column named {column:?}")]
    MissingColumn {
        /// Feed location.
        path: Utf8PathBuf,
        /// Missing column header.
        column: String,
    },
}

/// Read the feed at `path` and keep the stops inside `territory`.
pub fn read_candidates(
    feed: &ProviderFeed,
    path: &Utf8Path,
    territory: &(impl Territory + ?Sized),
) -> Result<CandidateSet, CandidateError> {
    let contents = stopdelta_fs::read_if_exists(path)
        .map_err(|source| FileError::read(path, source))?
        .ok_or_else(|| FileError::missing("stop feed", path))?;
    let set = filter_candidates(feed, contents.as_slice(), territory).map_err(|err| match err {
        FeedError::Csv(source) => CandidateError::Csv {
            path: path.to_owned(),
            source,
        },
        FeedError::MissingColumn(column) => CandidateError::MissingColumn {
            path: path.to_owned(),
            column,
        },
    })?;
    info!(
        "{}: {} stops inside the territory, {} outside, {} malformed",
        feed.name,
        set.candidates.len(),
        set.outside,
        set.malformed
    );
    Ok(set)
}

#[derive(Debug)]
enum FeedError {
    Csv(csv::Error),
    MissingColumn(String),
}

fn filter_candidates<R: Read>(
    feed: &ProviderFeed,
    reader: R,
    territory: &(impl Territory + ?Sized),
) -> Result<CandidateSet, FeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(FeedError::Csv)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| FeedError::MissingColumn(name.to_owned()))
    };
    let lat_index = column(&feed.lat_column)?;
    let lon_index = column(&feed.lon_column)?;
    let name_index = column(&feed.name_column)?;

    let mut set = CandidateSet::default();
    for record in csv_reader.records() {
        let record = record.map_err(FeedError::Csv)?;
        let coordinates = record
            .get(lat_index)
            .zip(record.get(lon_index))
            .and_then(|(lat, lon)| Some((lat.parse::<f64>().ok()?, lon.parse::<f64>().ok()?)))
            .filter(|(lat, lon)| lat.is_finite() && lon.is_finite());
        let Some((lat, lon)) = coordinates else {
            debug!("{}: skipped row with unusable coordinates: {record:?}", feed.name);
            set.malformed += 1;
            continue;
        };
        let name = record.get(name_index).unwrap_or_default();
        let candidate = StopCandidate::new(feed.name.as_str(), name, lon, lat);
        if territory.contains_stop(candidate.location) {
            set.candidates.push(candidate);
        } else {
            set.outside += 1;
        }
    }
    Ok(set)
}

#[derive(Debug, Serialize)]
struct ExtractRow<'a> {
    provider: &'a str,
    name: &'a str,
    lat: f64,
    lon: f64,
}

/// Write the accepted candidates as a per-provider CSV extract.
pub fn write_extract(set: &CandidateSet, path: &Utf8Path) -> Result<(), CandidateError> {
    let csv_error = |source| CandidateError::Csv {
        path: path.to_owned(),
        source,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    for candidate in &set.candidates {
        writer
            .serialize(ExtractRow {
                provider: &candidate.provider,
                name: &candidate.name,
                lat: candidate.location.y,
                lon: candidate.location.x,
            })
            .map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| FileError::write(path, err.into_error()))?;
    stopdelta_fs::write_bytes(path, &bytes).map_err(|source| FileError::write(path, source))?;
    Ok(())
}
