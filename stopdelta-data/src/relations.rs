//! Transfer relations and the interchange table.
//!
//! The relation table is exported by hand from a GIS tool, so lines arrive
//! quoted and sprinkled with `!` markers. Cleaning normalises them before any
//! pair is extracted. Every `<first> <second> ...` line gains a mirrored
//! `<second> : <first>` line appended at the end of the table.

use std::collections::{BTreeMap, HashMap, HashSet};

use camino::Utf8Path;
use log::{debug, info};
use stopdelta_core::relation::RECIPROCAL_SEPARATOR;
use stopdelta_core::{
    InterchangeCode, InterchangeRecord, ParseOutcome, ReciprocalEntry, SkipTally, StationId,
    TransferPair,
};

use crate::FileError;
use crate::format::parse_name_index_line;

/// Header line emitted by the GIS export.
pub const RELATION_HEADER: &str = "final_line";

/// Prefix of relation continuation lines ignored by the interchange table.
const CONTINUATION_PREFIX: char = '*';

/// Normalise one relation line, returning `None` for lines to drop.
///
/// Outer quotes are stripped, remaining `"` and `!` characters removed and
/// the result trimmed. Blank lines and the export header are dropped.
///
/// # Examples
/// ```
/// use stopdelta_data::relations::clean_relation_line;
///
/// assert_eq!(
///     clean_relation_line("\"1700005 8500010 002!\"").as_deref(),
///     Some("1700005 8500010 002")
/// );
/// assert_eq!(clean_relation_line("\"final_line\""), None);
/// ```
#[must_use]
pub fn clean_relation_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed);
    let cleaned: String = unquoted.chars().filter(|c| !matches!(c, '"' | '!')).collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty() && cleaned != RELATION_HEADER).then(|| cleaned.to_owned())
}

/// A relation table with its reciprocal lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTable {
    /// Cleaned input lines followed by the added reciprocal lines.
    pub lines: Vec<String>,
    /// Reciprocal lines added in this pass.
    pub added: Vec<ReciprocalEntry>,
    /// Pairs found in the input.
    pub pairs: usize,
    /// Input lines that are neither pairs nor reciprocal lines.
    pub unpaired: usize,
}

/// Clean `lines` and append a reciprocal line for every pair lacking one.
///
/// Reciprocal lines already in the input are recognised, so running the
/// output through again adds nothing.
pub fn build_relations<'a, I>(lines: I) -> RelationTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut table = RelationTable {
        lines: lines.into_iter().filter_map(clean_relation_line).collect(),
        ..RelationTable::default()
    };
    let mut present: HashSet<String> = table.lines.iter().cloned().collect();
    let mut pairs = Vec::new();
    for line in &table.lines {
        if let Some(pair) = TransferPair::from_line(line) {
            pairs.push(pair);
        } else if !is_reciprocal_line(line) {
            debug!("Relation line {line:?} holds no identifier pair");
            table.unpaired += 1;
        }
    }
    table.pairs = pairs.len();
    for pair in &pairs {
        let reciprocal = pair.reciprocal();
        if present.insert(reciprocal.to_string()) {
            table.added.push(reciprocal);
        }
    }
    table
        .lines
        .extend(table.added.iter().map(ToString::to_string));
    table
}

fn is_reciprocal_line(line: &str) -> bool {
    line.split_whitespace().nth(1) == Some(RECIPROCAL_SEPARATOR)
}

/// Read the relation table at `input`, add missing reciprocal lines and
/// write the result to `output`. `input` and `output` may be the same file.
pub fn process_relation_file(
    input: &Utf8Path,
    output: &Utf8Path,
) -> Result<RelationTable, FileError> {
    let contents = stopdelta_fs::read_to_string_if_exists(input)
        .map_err(|source| FileError::read(input, source))?
        .ok_or_else(|| FileError::missing("relation table", input))?;
    let table = build_relations(contents.lines());
    stopdelta_fs::write_lines(output, &table.lines)
        .map_err(|source| FileError::write(output, source))?;
    info!(
        "Wrote {output}: {} pairs, {} reciprocal lines added, {} lines without a pair",
        table.pairs,
        table.added.len(),
        table.unpaired
    );
    Ok(table)
}

/// Whether the last non-empty line is a `<digits> : <digits>` reciprocal.
/// Spaces around the colon are optional.
///
/// # Examples
/// ```
/// use stopdelta_data::relations::relation_table_is_complete;
///
/// assert!(relation_table_is_complete(["1700005 8500010 002", "8500010 : 1700005", ""]));
/// assert!(relation_table_is_complete(["1700005 8500010 002", "8500010:1700005"]));
/// assert!(!relation_table_is_complete(["1700005 8500010 002"]));
/// ```
pub fn relation_table_is_complete<'a, I>(lines: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let last = lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .last();
    let Some(last) = last else {
        return false;
    };
    let is_digits = |token: &str| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit());
    last.trim()
        .split_once(RECIPROCAL_SEPARATOR)
        .is_some_and(|(second, first)| is_digits(second.trim()) && is_digits(first.trim()))
}

/// Check the relation table file at `path`.
pub fn relation_file_is_complete(path: &Utf8Path) -> Result<bool, FileError> {
    let contents = stopdelta_fs::read_to_string_if_exists(path)
        .map_err(|source| FileError::read(path, source))?
        .ok_or_else(|| FileError::missing("relation table", path))?;
    Ok(relation_table_is_complete(contents.lines()))
}

/// Interchange records with the count of unreadable name index lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterchangeTable {
    /// Records sorted by identifier.
    pub records: Vec<InterchangeRecord>,
    /// Name index lines that could not be parsed.
    pub skipped: SkipTally,
}

/// Join the name index with the relation table.
///
/// Each name index station receives the code of the first relation line
/// that starts with its identifier, or `00` when none does.
pub fn build_interchange_table<'a, 'b, N, R>(name_lines: N, relation_lines: R) -> InterchangeTable
where
    N: IntoIterator<Item = &'a str>,
    R: IntoIterator<Item = &'b str>,
{
    let mut table = InterchangeTable::default();
    let mut stations: BTreeMap<(StationId, String), String> = BTreeMap::new();
    for line in name_lines {
        match parse_name_index_line(line) {
            ParseOutcome::Parsed(indexed) => {
                stations.insert((indexed.id, indexed.raw_id), indexed.name);
            }
            ParseOutcome::Skipped(reason) => {
                debug!("Skipped name index line {line:?}: {reason}");
                table.skipped.record(&reason);
            }
        }
    }
    let wanted: HashSet<&str> = stations.keys().map(|(_, raw)| raw.as_str()).collect();

    let mut codes: HashMap<String, InterchangeCode> = HashMap::new();
    for line in relation_lines {
        let line = line.trim();
        if line.starts_with(CONTINUATION_PREFIX) {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [first, second, code, ..] = tokens.as_slice() else {
            continue;
        };
        if *second == RECIPROCAL_SEPARATOR || !wanted.contains(first) {
            continue;
        }
        codes
            .entry((*first).to_owned())
            .or_insert_with(|| InterchangeCode::from_token(code));
    }

    table.records = stations
        .into_iter()
        .map(|((_, raw_id), name)| InterchangeRecord {
            code: codes.remove(&raw_id).unwrap_or_default(),
            id: raw_id,
            name,
        })
        .collect();
    table
}

/// Build the interchange table from the name index and relation table files
/// and write it to `output`. Both inputs are required.
pub fn write_interchange_table(
    name_index: &Utf8Path,
    relation_table: &Utf8Path,
    output: &Utf8Path,
) -> Result<InterchangeTable, FileError> {
    let names = stopdelta_fs::read_to_string_if_exists(name_index)
        .map_err(|source| FileError::read(name_index, source))?
        .ok_or_else(|| FileError::missing("name index", name_index))?;
    let relations = stopdelta_fs::read_to_string_if_exists(relation_table)
        .map_err(|source| FileError::read(relation_table, source))?
        .ok_or_else(|| FileError::missing("relation table", relation_table))?;
    let table = build_interchange_table(names.lines(), relations.lines());
    stopdelta_fs::write_lines(output, table.records.iter().map(ToString::to_string))
        .map_err(|source| FileError::write(output, source))?;
    info!("Wrote {output}: {} interchange records", table.records.len());
    Ok(table)
}
