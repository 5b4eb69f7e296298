use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Scratch directory holding the delta files of one test.
pub struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    /// Create an empty scratch directory.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("failed to create tempdir: {err}"));
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("tempdir {path:?} is not UTF-8"));
        Self { _dir: dir, root }
    }

    /// Absolute path of `relative` inside the workspace.
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|err| panic!("failed to create {parent:?}: {err}"));
        }
        fs::write(&path, contents).unwrap_or_else(|err| panic!("failed to write {path:?}: {err}"));
        path
    }

    /// Read a file written by the code under test.
    pub fn read(&self, path: &Utf8Path) -> String {
        fs::read_to_string(path).unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"))
    }

    /// Read a file as individual lines.
    pub fn lines(&self, path: &Utf8Path) -> Vec<String> {
        self.read(path).lines().map(str::to_owned).collect()
    }
}

/// Reference baseline with two published stations.
pub const REFERENCE_BASELINE: &str = "\
8500010    7.589563  47.547412 260      % Basel SBB
8503000    8.540192  47.378177 408      % Zuerich HB
";
