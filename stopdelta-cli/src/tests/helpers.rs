//! Test helpers for laying out CLI workspaces on disk.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Reference baseline holding Basel SBB and Zuerich HB.
pub(super) const REFERENCE_BASELINE: &str = "\
8500010    7.589563  47.547412 260      % Basel SBB
8503000    8.540192  47.378177 408      % Zuerich HB
";

/// Feed with Basel SBB, already published, and Bern, which is not.
pub(super) const FLIXBUS_FEED: &str = "\
stop_id,stop_name,stop_lat,stop_lon
1,Basel SBB,47.547412,7.589563
2,Bern,46.948,7.439
";

pub(super) struct CliWorkspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl CliWorkspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn raw_dir(&self) -> Utf8PathBuf {
        self.root.join("raw")
    }

    pub(super) fn delta_dir(&self) -> Utf8PathBuf {
        self.root.join("delta")
    }

    pub(super) fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    pub(super) fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(relative);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write test file");
}
