//! Error types shared by the delta file operations.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing delta and reference files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FileError {
    /// A file required by the operation does not exist.
    #[error("required {what} file {path:?} does not exist")]
    MissingInput {
        /// Role of the file, e.g. `"reference baseline"`.
        what: &'static str,
        /// Location that was probed.
        path: Utf8PathBuf,
    },
    /// Reading the file failed.
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing or appending to the file failed.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// File being written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl FileError {
    pub(crate) fn read(path: &camino::Utf8Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_owned(),
            source,
        }
    }

    pub(crate) fn write(path: &camino::Utf8Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_owned(),
            source,
        }
    }

    pub(crate) fn missing(what: &'static str, path: &camino::Utf8Path) -> Self {
        Self::MissingInput {
            what,
            path: path.to_owned(),
        }
    }
}
