//! Core domain types for the stop delta engine.
//!
//! These types describe the records that move between the provider feeds,
//! the coordinate ledger, the station name index and the relation tables.
//! They carry no I/O; reading and writing the delta files lives in
//! `stopdelta-data`.
//!
//! Coordinates are WGS84 `geo::Coord` values with `x = longitude` and
//! `y = latitude`.

pub mod coord;
pub mod identifier;
pub mod outcome;
pub mod relation;
pub mod stop;
pub mod territory;

pub use coord::{CoordKey, EARTH_RADIUS_METRES, haversine_distance};
pub use identifier::{StationId, StationIdError};
pub use outcome::{ParseOutcome, SkipReason, SkipTally};
pub use relation::{InterchangeCode, InterchangeRecord, ReciprocalEntry, TransferPair};
pub use stop::{LedgerEntry, NameIndexEntry, ReferenceEntry, StopCandidate};
pub use territory::{Territory, Unbounded};
