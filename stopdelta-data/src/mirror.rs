//! CSV mirrors of the fixed-width files for inspection in GIS tools.

use std::io;

use camino::Utf8Path;
use log::{info, warn};
use serde::Serialize;
use stopdelta_core::ParseOutcome;

use crate::FileError;
use crate::format::parse_reference_line;
use crate::ledger::Ledger;

#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    id: String,
    lon: f64,
    lat: f64,
    name: &'a str,
    provider: &'a str,
}

#[derive(Debug, Serialize)]
struct ReferenceRow<'a> {
    id: String,
    lon: f64,
    lat: f64,
    name: &'a str,
}

fn write_rows<T: Serialize>(output: &Utf8Path, rows: &[T]) -> Result<(), FileError> {
    let as_io = |err: csv::Error| FileError::write(output, io::Error::from(err));
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(as_io)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| FileError::write(output, err.into_error()))?;
    stopdelta_fs::write_bytes(output, &bytes).map_err(|source| FileError::write(output, source))
}

/// Mirror the ledger at `ledger_path` to `output` with the header
/// `id,lon,lat,name,provider`.
///
/// Returns the number of rows written, or `None` when the ledger is absent.
/// Unidentified entries have an empty `id`.
pub fn write_ledger_mirror(
    ledger_path: &Utf8Path,
    output: &Utf8Path,
) -> Result<Option<usize>, FileError> {
    let Some(ledger) = Ledger::load(ledger_path)? else {
        warn!("Ledger {ledger_path} does not exist; no mirror written");
        return Ok(None);
    };
    let rows: Vec<LedgerRow<'_>> = ledger
        .records()
        .iter()
        .map(|record| LedgerRow {
            id: record.entry.id.map(|id| id.to_string()).unwrap_or_default(),
            lon: record.entry.location.x,
            lat: record.entry.location.y,
            name: &record.entry.name,
            provider: record.entry.provider.as_deref().unwrap_or_default(),
        })
        .collect();
    write_rows(output, &rows)?;
    info!("Mirrored {} ledger entries to {output}", rows.len());
    Ok(Some(rows.len()))
}

/// Mirror the reference baseline at `reference_path` to `output` with the
/// header `id,lon,lat,name`.
///
/// Returns the number of rows written, or `None` when the baseline is absent.
pub fn write_reference_mirror(
    reference_path: &Utf8Path,
    output: &Utf8Path,
) -> Result<Option<usize>, FileError> {
    let Some(contents) = stopdelta_fs::read_to_string_if_exists(reference_path)
        .map_err(|source| FileError::read(reference_path, source))?
    else {
        warn!("Reference baseline {reference_path} does not exist; no mirror written");
        return Ok(None);
    };
    let entries: Vec<_> = contents
        .lines()
        .filter_map(|line| match parse_reference_line(line) {
            ParseOutcome::Parsed(entry) => Some(entry),
            ParseOutcome::Skipped(_) => None,
        })
        .collect();
    let rows: Vec<ReferenceRow<'_>> = entries
        .iter()
        .map(|entry| ReferenceRow {
            id: entry.id.to_string(),
            lon: entry.location.x,
            lat: entry.location.y,
            name: &entry.name,
        })
        .collect();
    write_rows(output, &rows)?;
    info!("Mirrored {} reference entries to {output}", rows.len());
    Ok(Some(rows.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{REFERENCE_BASELINE, Workspace};
    use rstest::rstest;

    #[rstest]
    fn mirrors_the_ledger() {
        let workspace = Workspace::new();
        let ledger = workspace.write(
            "delta/ledger",
            "1700000   12.345600  47.123400         % TestStop [TestCo]\n\
             \u{20}  9.530000  46.850000    % Chur, Post\n",
        );
        let output = workspace.path("csv/ledger.csv");
        let rows = write_ledger_mirror(&ledger, &output).expect("mirror");
        assert_eq!(rows, Some(2));
        assert_eq!(
            workspace.lines(&output),
            [
                "id,lon,lat,name,provider",
                "1700000,12.3456,47.1234,TestStop,TestCo",
                ",9.53,46.85,\"Chur, Post\",",
            ]
        );
    }

    #[rstest]
    fn mirrors_the_reference_baseline() {
        let workspace = Workspace::new();
        let reference = workspace.write("raw/reference", REFERENCE_BASELINE);
        let output = workspace.path("csv/reference.csv");
        write_reference_mirror(&reference, &output).expect("mirror");
        assert_eq!(
            workspace.lines(&output),
            [
                "id,lon,lat,name",
                "8500010,7.589563,47.547412,Basel SBB",
                "8503000,8.540192,47.378177,Zuerich HB",
            ]
        );
    }

    #[rstest]
    fn absent_inputs_write_nothing() {
        let workspace = Workspace::new();
        let output = workspace.path("csv/ledger.csv");
        let rows = write_ledger_mirror(&workspace.path("delta/ledger"), &output).expect("mirror");
        assert_eq!(rows, None);
        assert!(!output.exists());
    }
}
