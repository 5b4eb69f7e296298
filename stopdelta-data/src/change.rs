//! Content-hash gate for downloaded provider artefacts.
//!
//! A freshly downloaded feed is compared with the last copy kept on disk.
//! Downstream stages only run when at least one feed changed.

use std::fmt;

use camino::Utf8Path;
use log::info;
use sha2::{Digest, Sha256};

use crate::FileError;

/// SHA-256 digest of an artefact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest `bytes`.
    ///
    /// # Examples
    /// ```
    /// use stopdelta_data::change::ContentDigest;
    ///
    /// assert_eq!(
    ///     ContentDigest::of(b"abc").to_string(),
    ///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    /// );
    /// ```
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0
            .iter()
            .try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

/// Outcome of [`persist_if_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// No previous copy existed; the content was written.
    Created,
    /// The previous copy differed; the content was written.
    Updated,
    /// The previous copy was identical; nothing was written.
    Unchanged,
}

impl ChangeStatus {
    /// Whether downstream stages need to run.
    #[must_use]
    pub const fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Digest of the file at `path`, or `None` when it does not exist.
pub fn file_digest(path: &Utf8Path) -> Result<Option<ContentDigest>, FileError> {
    let contents =
        stopdelta_fs::read_if_exists(path).map_err(|source| FileError::read(path, source))?;
    Ok(contents.as_deref().map(ContentDigest::of))
}

/// Report whether `new_content` differs from the file at `path`.
///
/// A missing file counts as changed. Nothing is written.
pub fn changed(path: &Utf8Path, new_content: &[u8]) -> Result<bool, FileError> {
    let previous = file_digest(path)?;
    Ok(previous != Some(ContentDigest::of(new_content)))
}

/// Write `new_content` to `path` only when it differs from the current copy.
pub fn persist_if_changed(path: &Utf8Path, new_content: &[u8]) -> Result<ChangeStatus, FileError> {
    let previous = file_digest(path)?;
    let status = match previous {
        None => ChangeStatus::Created,
        Some(digest) if digest == ContentDigest::of(new_content) => ChangeStatus::Unchanged,
        Some(_) => ChangeStatus::Updated,
    };
    if status.is_changed() {
        stopdelta_fs::write_bytes(path, new_content)
            .map_err(|source| FileError::write(path, source))?;
        info!("Stored {path} ({status:?})");
    } else {
        info!("No changes detected in {path}");
    }
    Ok(status)
}
