//! Line parsers for the fixed-width delta and reference files.
//!
//! Each parser turns one line into a [`ParseOutcome`]; none of them fail.

use geo::Coord;
use stopdelta_core::stop::{NAME_INDEX_SUFFIX, NAME_SEPARATOR};
use stopdelta_core::{LedgerEntry, ParseOutcome, ReferenceEntry, SkipReason, StationId};

/// Split a line into its coordinate columns and the trimmed name segment.
pub(crate) fn split_name(line: &str) -> (&str, &str) {
    match line.split_once(NAME_SEPARATOR) {
        Some((columns, name)) => (columns, name.trim()),
        None => (line, ""),
    }
}

/// Split a trailing `[provider]` tag off a name segment.
///
/// ```text
/// "Bern, Wankdorf [Flixbus]" -> ("Bern, Wankdorf", Some("Flixbus"))
/// "Bern, Wankdorf"           -> ("Bern, Wankdorf", None)
/// ```
pub(crate) fn split_provider_tag(segment: &str) -> (&str, Option<&str>) {
    segment
        .strip_suffix(']')
        .and_then(|rest| rest.rsplit_once('['))
        .map_or((segment, None), |(name, provider)| {
            (name.trim_end(), Some(provider))
        })
}

fn parse_number(token: &str) -> Result<f64, SkipReason> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| SkipReason::InvalidNumber {
            token: token.to_owned(),
        })
}

fn parse_id(token: &str) -> Result<StationId, SkipReason> {
    token
        .parse::<StationId>()
        .map_err(|_| SkipReason::InvalidIdentifier {
            token: token.to_owned(),
        })
}

fn parse_location(lon: &str, lat: &str) -> Result<Coord<f64>, SkipReason> {
    Ok(Coord {
        x: parse_number(lon)?,
        y: parse_number(lat)?,
    })
}

/// Parse a ledger line in either its pre- or post-identifier layout.
///
/// Two coordinate columns mean the entry has no identifier yet; three mean
/// the first column is the identifier.
pub fn parse_ledger_line(line: &str) -> ParseOutcome<LedgerEntry> {
    match try_parse_ledger_line(line) {
        Ok(entry) => ParseOutcome::Parsed(entry),
        Err(reason) => ParseOutcome::Skipped(reason),
    }
}

fn try_parse_ledger_line(line: &str) -> Result<LedgerEntry, SkipReason> {
    if line.trim().is_empty() {
        return Err(SkipReason::Blank);
    }
    let (columns, segment) = split_name(line);
    let tokens: Vec<&str> = columns.split_whitespace().collect();
    let (id, location) = match tokens.as_slice() {
        [lon, lat] => (None, parse_location(lon, lat)?),
        [id, lon, lat, ..] => (Some(parse_id(id)?), parse_location(lon, lat)?),
        _ => {
            return Err(SkipReason::MissingColumns {
                expected: 2,
                found: tokens.len(),
            });
        }
    };
    let (name, provider) = split_provider_tag(segment);
    Ok(LedgerEntry {
        id,
        location,
        name: name.to_owned(),
        provider: provider.map(str::to_owned),
    })
}

/// Parse a reference baseline line, `id lon lat [...] [% name]`.
pub fn parse_reference_line(line: &str) -> ParseOutcome<ReferenceEntry> {
    match try_parse_reference_line(line) {
        Ok(entry) => ParseOutcome::Parsed(entry),
        Err(reason) => ParseOutcome::Skipped(reason),
    }
}

fn try_parse_reference_line(line: &str) -> Result<ReferenceEntry, SkipReason> {
    if line.trim().is_empty() {
        return Err(SkipReason::Blank);
    }
    let (columns, name) = split_name(line);
    let tokens: Vec<&str> = columns.split_whitespace().collect();
    let [id, lon, lat, ..] = tokens.as_slice() else {
        return Err(SkipReason::MissingColumns {
            expected: 3,
            found: tokens.len(),
        });
    };
    Ok(ReferenceEntry {
        id: parse_id(id)?,
        location: parse_location(lon, lat)?,
        name: name.to_owned(),
    })
}

/// Identifier in the leading column of a reference line, if it parses.
///
/// Identifiers count as used even when the rest of the line is malformed.
pub fn parse_leading_id(line: &str) -> Option<StationId> {
    line.split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
}

/// A parsed name index line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedName {
    /// Identifier token exactly as written.
    pub raw_id: String,
    /// Parsed identifier.
    pub id: StationId,
    /// Name with the index suffix removed.
    pub name: String,
}

/// Parse a name index line, `<id> <name>$<1>`.
pub fn parse_name_index_line(line: &str) -> ParseOutcome<IndexedName> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ParseOutcome::Skipped(SkipReason::Blank);
    }
    let Some((raw_id, rest)) = trimmed.split_once(char::is_whitespace) else {
        return ParseOutcome::Skipped(SkipReason::MissingColumns {
            expected: 2,
            found: 1,
        });
    };
    match parse_id(raw_id) {
        Ok(id) => ParseOutcome::Parsed(IndexedName {
            raw_id: raw_id.to_owned(),
            id,
            name: rest.replace(NAME_INDEX_SUFFIX, "").trim().to_owned(),
        }),
        Err(reason) => ParseOutcome::Skipped(reason),
    }
}
