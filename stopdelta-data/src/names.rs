//! Projection of identified ledger entries into the station name index.

use std::collections::HashSet;

use camino::Utf8Path;
use log::{debug, info, warn};
use stopdelta_core::NameIndexEntry;

use crate::FileError;
use crate::append::append_terminated;
use crate::ledger::Ledger;

/// Summary of [`write_names`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameDeltaReport {
    /// Lines appended to the name index.
    pub added: usize,
    /// Lines already present in the name index.
    pub already_present: usize,
    /// Entries of the provider still waiting for an identifier.
    pub unidentified: usize,
}

/// Append a name index line for every identified ledger entry tagged with
/// `provider`.
///
/// A line is only written when the exact same line is not already in the
/// index, so re-running for the same or another provider never duplicates
/// lines. An absent ledger is nothing to do.
pub fn write_names(
    ledger_path: &Utf8Path,
    provider: &str,
    output: &Utf8Path,
) -> Result<NameDeltaReport, FileError> {
    let mut report = NameDeltaReport::default();
    let Some(ledger) = Ledger::load(ledger_path)? else {
        warn!("Ledger {ledger_path} does not exist; no names to write for {provider}");
        return Ok(report);
    };
    let existing = stopdelta_fs::read_to_string_if_exists(output)
        .map_err(|source| FileError::read(output, source))?
        .unwrap_or_default();
    let present: HashSet<&str> = existing.lines().collect();

    let mut added: Vec<String> = Vec::new();
    for record in ledger.records() {
        let entry = &record.entry;
        if entry.provider.as_deref() != Some(provider) {
            continue;
        }
        let Some(id) = entry.id else {
            report.unidentified += 1;
            continue;
        };
        let line = NameIndexEntry::new(id, entry.name.as_str()).to_string();
        if present.contains(line.as_str()) || added.contains(&line) {
            debug!("{line:?} is already in the name index");
            report.already_present += 1;
        } else {
            added.push(line);
        }
    }
    report.added = added.len();

    append_terminated(output, &existing, &added)?;
    info!(
        "{provider}: {} names added to {output}, {} already present",
        report.added, report.already_present
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Workspace;
    use rstest::rstest;

    const LEDGER: &str = "\
1700000   12.345600  47.123400         % TestStop [TestCo]
1700001    7.439000  46.948000         % Bern [Flixbus]
   9.530000  46.850000    % Chur [TestCo]
";

    #[rstest]
    fn writes_identified_entries_of_the_provider() {
        let workspace = Workspace::new();
        let ledger = workspace.write("delta/ledger", LEDGER);
        let index = workspace.path("delta/names");
        let report = write_names(&ledger, "TestCo", &index).expect("names");
        assert_eq!(
            report,
            NameDeltaReport {
                added: 1,
                already_present: 0,
                unidentified: 1,
            }
        );
        assert_eq!(workspace.lines(&index), ["1700000      TestStop$<1>"]);
    }

    #[rstest]
    fn rerunning_appends_nothing() {
        let workspace = Workspace::new();
        let ledger = workspace.write("delta/ledger", LEDGER);
        let index = workspace.write("delta/names", "0000001      Elsewhere$<1>\n");
        write_names(&ledger, "TestCo", &index).expect("names");
        write_names(&ledger, "Flixbus", &index).expect("names");
        let report = write_names(&ledger, "TestCo", &index).expect("names");
        assert_eq!(report.added, 0);
        assert_eq!(report.already_present, 1);
        assert_eq!(
            workspace.lines(&index),
            [
                "0000001      Elsewhere$<1>",
                "1700000      TestStop$<1>",
                "1700001      Bern$<1>",
            ]
        );
    }

    #[rstest]
    fn absent_ledger_is_nothing_to_do() {
        let workspace = Workspace::new();
        let index = workspace.path("delta/names");
        let report = write_names(&workspace.path("delta/ledger"), "TestCo", &index)
            .expect("names");
        assert_eq!(report, NameDeltaReport::default());
        assert!(!index.exists());
    }
}
