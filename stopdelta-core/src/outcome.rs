//! Per-line parse outcomes.
//!
//! Delta files are parsed line by line. A line that cannot be understood is
//! never fatal: it becomes a [`ParseOutcome::Skipped`] carrying the reason,
//! and callers fold the outcomes into counts for their reports.

use std::fmt;

/// Result of parsing one line of a delta or reference file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// The line yielded a record.
    Parsed(T),
    /// The line was skipped.
    Skipped(SkipReason),
}

impl<T> ParseOutcome<T> {
    /// Convert into an `Option`, discarding the skip reason.
    pub fn parsed(self) -> Option<T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Skipped(_) => None,
        }
    }

    /// Map the parsed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            Self::Parsed(value) => ParseOutcome::Parsed(f(value)),
            Self::Skipped(reason) => ParseOutcome::Skipped(reason),
        }
    }
}

/// Why a line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The line contained only whitespace.
    Blank,
    /// Fewer coordinate columns than required.
    MissingColumns {
        /// Columns required.
        expected: usize,
        /// Columns found.
        found: usize,
    },
    /// A coordinate column did not parse as a number.
    InvalidNumber {
        /// Offending token.
        token: String,
    },
    /// The identifier column did not parse.
    InvalidIdentifier {
        /// Offending token.
        token: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("blank line"),
            Self::MissingColumns { expected, found } => {
                write!(f, "expected {expected} columns, found {found}")
            }
            Self::InvalidNumber { token } => write!(f, "'{token}' is not a number"),
            Self::InvalidIdentifier { token } => write!(f, "'{token}' is not an identifier"),
        }
    }
}

/// Count of skipped lines, split into blank and malformed lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipTally {
    /// Blank lines.
    pub blank: usize,
    /// Lines that failed to parse.
    pub malformed: usize,
}

impl SkipTally {
    /// Record one skipped line.
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::Blank => self.blank += 1,
            _ => self.malformed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn tally_separates_blank_from_malformed() {
        let mut tally = SkipTally::default();
        tally.record(&SkipReason::Blank);
        tally.record(&SkipReason::InvalidNumber { token: "x".into() });
        tally.record(&SkipReason::MissingColumns {
            expected: 2,
            found: 1,
        });
        assert_eq!(
            tally,
            SkipTally {
                blank: 1,
                malformed: 2
            }
        );
    }

    #[rstest]
    fn outcomes_map_and_unwrap() {
        let parsed: ParseOutcome<u8> = ParseOutcome::Parsed(2);
        assert_eq!(parsed.map(|value| value * 2).parsed(), Some(4));
        let skipped: ParseOutcome<u8> = ParseOutcome::Skipped(SkipReason::Blank);
        assert_eq!(skipped.parsed(), None);
    }
}
