//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Every delta file is read whole at the start of an operation and appended
//! to or rewritten whole at the end. These helpers cover exactly those access
//! patterns and treat a missing file as a value rather than an error where the
//! callers need that.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, ErrorKind, Write};
use std::path::Component;

/// Resolve an ambient directory for the given path and return the directory with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Ensure the parent directory for `path` exists, handling absolute paths safely for cap-std.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_os_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)?;
    Ok(())
}

/// Return whether a path exists and is a regular file.
///
/// A missing file, or a missing parent directory, yields `Ok(false)`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Read a whole file as bytes, returning `None` when it does not exist.
pub fn read_if_exists(path: &Utf8Path) -> io::Result<Option<Vec<u8>>> {
    if !file_is_file(path)? {
        return Ok(None);
    }
    let (dir, name) = open_dir_and_file(path)?;
    dir.read(name.as_str()).map(Some)
}

/// Read a whole UTF-8 file, returning `None` when it does not exist.
pub fn read_to_string_if_exists(path: &Utf8Path) -> io::Result<Option<String>> {
    if !file_is_file(path)? {
        return Ok(None);
    }
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str()).map(Some)
}

/// Replace the contents of `path`, creating parent directories as needed.
pub fn write_bytes(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.write(name.as_str(), contents)
}

/// Replace the contents of `path` with newline-terminated `lines`.
pub fn write_lines<I, S>(path: &Utf8Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    write_bytes(path, join_lines(lines).as_bytes())
}

/// Append newline-terminated `lines` to `path`, creating it when missing.
pub fn append_lines<I, S>(path: &Utf8Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    let mut file = dir.open_with(name.as_str(), &options)?;
    file.write_all(join_lines(lines).as_bytes())?;
    file.flush()
}

fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().fold(String::new(), |mut buffer, line| {
        buffer.push_str(line.as_ref());
        buffer.push('\n');
        buffer
    })
}

/// Split an absolute or relative parent path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;

            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        // Unix-style absolute path.
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        // Relative path: resolve from the current directory.
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;

    Ok((dir, relative))
}
