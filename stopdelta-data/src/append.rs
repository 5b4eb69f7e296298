//! Appending lines to text files that may lack a final newline.

use camino::Utf8Path;

use crate::FileError;

/// Append `lines` to `path`, whose current contents are `existing`.
///
/// When `existing` does not end in a newline one is written first, so the
/// previous last line is never joined with the first appended line.
pub(crate) fn append_terminated(
    path: &Utf8Path,
    existing: &str,
    lines: &[String],
) -> Result<(), FileError> {
    if lines.is_empty() {
        return Ok(());
    }
    let separator = (!existing.is_empty() && !existing.ends_with('\n')).then_some("");
    stopdelta_fs::append_lines(
        path,
        separator
            .into_iter()
            .chain(lines.iter().map(String::as_str)),
    )
    .map_err(|source| FileError::write(path, source))
}
