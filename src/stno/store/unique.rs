//! Collision-free file creation.
//!
//! [`allocate`] probes `dir/{prefix}0{suffix}`, `dir/{prefix}1{suffix}`, ...
//! with exclusive creates and returns the first name that was free. Probing
//! is sequential rather than random so that entry files sort and read
//! predictably. The cost is a linear scan under contention, which is fine for
//! a single-user notebook.

use crate::error::{Result, StnoError};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Upper bound on probes before giving up with [`StnoError::Exhausted`].
pub const MAX_ATTEMPTS: usize = 10_000;

/// Creates and opens a new file in `dir` whose name starts with `prefix` and
/// ends with `suffix`. The caller owns the returned handle.
///
/// Names containing path separators are rejected: the allocator never creates
/// files outside `dir`.
pub fn allocate(dir: &Path, prefix: &str, suffix: &str) -> Result<(PathBuf, File)> {
    allocate_bounded(dir, prefix, suffix, MAX_ATTEMPTS)
}

/// [`allocate`] with an explicit attempt limit.
pub fn allocate_bounded(
    dir: &Path,
    prefix: &str,
    suffix: &str,
    max_attempts: usize,
) -> Result<(PathBuf, File)> {
    if has_separator(prefix) || has_separator(suffix) {
        return Err(StnoError::InvalidIdentifier(format!("{prefix}{suffix}")));
    }

    for i in 0..max_attempts {
        let path = dir.join(format!("{prefix}{i}{suffix}"));
        match create_new(&path) {
            Ok(file) => {
                debug!(path = %path.display(), attempt = i, "allocated unique file");
                return Ok((path, file));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(StnoError::Io(e)),
        }
    }

    Err(StnoError::Exhausted {
        dir: dir.to_path_buf(),
        prefix: prefix.to_string(),
        attempts: max_attempts,
    })
}

/// Exclusive create: fails with `AlreadyExists` if `path` is taken.
pub(crate) fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains('\\') || s.contains(std::path::MAIN_SEPARATOR)
}
