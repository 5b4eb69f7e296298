//! Numeric station identifiers as published in the timetable master data.
//!
//! Identifiers render as seven-digit, zero-padded integers. Formatting honours
//! width and alignment flags so that fixed-column layouts such as `{:<8}` work
//! directly on the identifier.
//!
//! # Examples
//! ```
//! use stopdelta_core::StationId;
//!
//! let id: StationId = "0042".parse().expect("digits parse");
//! assert_eq!(id.to_string(), "0000042");
//! assert_eq!(format!("{id:<8}|"), "0000042 |");
//! ```
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Digits used when rendering an identifier.
pub const STATION_ID_DIGITS: usize = 7;

/// A station identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StationId(u32);

/// Errors returned when parsing a [`StationId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationIdError {
    /// The token was empty.
    #[error("station identifier is empty")]
    Empty,
    /// The token contained something other than ASCII digits.
    #[error("station identifier '{token}' is not numeric")]
    NotNumeric {
        /// Offending token.
        token: String,
    },
    /// The value does not fit the identifier range.
    #[error("station identifier '{token}' is out of range")]
    OutOfRange {
        /// Offending token.
        token: String,
    },
}

impl StationId {
    /// Wrap a raw identifier value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Return the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Return the following identifier, or `None` once the range is exhausted.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u32> for StationId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:0width$}", self.0, width = STATION_ID_DIGITS))
    }
}

impl FromStr for StationId {
    type Err = StationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(StationIdError::Empty);
        }
        if !token.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(StationIdError::NotNumeric {
                token: token.to_owned(),
            });
        }
        token
            .parse::<u32>()
            .map(Self)
            .map_err(|_| StationIdError::OutOfRange {
                token: token.to_owned(),
            })
    }
}
