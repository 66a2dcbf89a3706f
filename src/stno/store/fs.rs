use super::unique::{allocate, create_new};
use super::{validate_prefix, validate_uid, EntryStore, ENTRY_EXT};
use crate::error::{Result, StnoError};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory-backed entry store: one `<uid>.toml` file per entry.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Opens a store at `dir`, creating the directory tree if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        store.ensure_dir(&store.dir)?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `uid`, whether or not it exists.
    pub fn entry_path(&self, uid: &str) -> Result<PathBuf> {
        let parts = validate_uid(uid)?;
        let mut path = self.dir.clone();
        let (last, sections) = parts
            .split_last()
            .ok_or_else(|| StnoError::InvalidIdentifier(uid.to_string()))?;
        for section in sections {
            path.push(section);
        }
        path.push(format!("{}.{}", last, ENTRY_EXT));
        Ok(path)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(StnoError::Io)?;
        }
        Ok(())
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) => self.ensure_dir(parent),
            None => Ok(()),
        }
    }

    fn is_entry_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXT)
    }

    /// Turns `<dir>/a/b.toml` into `a/b`. Non-UTF-8 names are skipped.
    fn uid_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.dir).ok()?.with_extension("");
        let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
        let Some(parts) = parts else {
            debug!(path = %path.display(), "skipping entry with non UTF-8 name");
            return None;
        };
        let uid = parts.join("/");
        if validate_uid(&uid).is_err() {
            debug!(path = %path.display(), "skipping entry with unusable name");
            return None;
        }
        Some(uid)
    }

    fn list_section(&self, section: &Path, uids: &mut Vec<String>) -> Result<()> {
        for item in WalkDir::new(section).follow_links(true) {
            let item = match item {
                Ok(item) => item,
                Err(e) if is_vanished(e.io_error()) => {
                    debug!(path = ?e.path(), "skipping vanished entry");
                    continue;
                }
                Err(e) => return Err(StnoError::Io(e.into())),
            };
            if item.file_type().is_file() && Self::is_entry_file(item.path()) {
                if let Some(uid) = self.uid_for(item.path()) {
                    uids.push(uid);
                }
            }
        }
        Ok(())
    }
}

/// A path that disappeared between globbing and stat, or a dangling symlink.
fn is_vanished(err: Option<&std::io::Error>) -> bool {
    err.is_some_and(|e| e.kind() == ErrorKind::NotFound)
}

impl EntryStore for FileStore {
    type Reader = File;
    type Writer = File;

    fn list_entries(&self, prefix: &str) -> Result<Vec<String>> {
        if prefix.contains('/') || prefix.contains('\\') {
            return Err(StnoError::InvalidIdentifier(prefix.to_string()));
        }
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let dir = self.dir.to_str().ok_or_else(|| {
            StnoError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("store path is not valid UTF-8: {}", self.dir.display()),
            ))
        })?;
        let pattern = format!(
            "{}/{}*",
            glob::Pattern::escape(dir),
            glob::Pattern::escape(prefix)
        );
        let matches =
            glob::glob(&pattern).map_err(|_| StnoError::InvalidIdentifier(prefix.to_string()))?;

        let mut uids = Vec::new();
        for path in matches {
            let path = path.map_err(|e| StnoError::Io(e.into_error()))?;
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if is_vanished(Some(&e)) => {
                    debug!(path = %path.display(), "skipping vanished entry");
                    continue;
                }
                Err(e) => return Err(StnoError::Io(e)),
            };
            if meta.is_dir() {
                self.list_section(&path, &mut uids)?;
            } else if meta.is_file() && Self::is_entry_file(&path) {
                if let Some(uid) = self.uid_for(&path) {
                    uids.push(uid);
                }
            }
        }

        debug!(dir = %self.dir.display(), prefix, count = uids.len(), "listed entries");
        Ok(uids)
    }

    fn new_entry_reader(&self, uid: &str) -> Result<File> {
        let path = self.entry_path(uid)?;
        File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StnoError::NotFound(uid.to_string()),
            _ => StnoError::Io(e),
        })
    }

    fn new_entry_writer(&self, uid: &str) -> Result<File> {
        let path = self.entry_path(uid)?;
        self.ensure_parent(&path)?;
        File::create(&path).map_err(StnoError::Io)
    }

    fn new_unique_entry_writer(&self, prefix: &str) -> Result<(String, File)> {
        validate_prefix(prefix)?;
        self.ensure_dir(&self.dir)?;

        let preferred = self.entry_path(prefix)?;
        match create_new(&preferred) {
            Ok(file) => return Ok((prefix.to_string(), file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(StnoError::Io(e)),
        }

        let suffix = format!(".{}", ENTRY_EXT);
        let (path, file) = allocate(&self.dir, &format!("{}-", prefix), &suffix)?;
        let uid = self
            .uid_for(&path)
            .ok_or_else(|| StnoError::InvalidIdentifier(prefix.to_string()))?;
        Ok((uid, file))
    }

    fn remove(&self, uid: &str) -> Result<()> {
        let path = self.entry_path(uid)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StnoError::NotFound(uid.to_string()),
            _ => StnoError::Io(e),
        })?;
        debug!(uid, "removed entry");
        Ok(())
    }

    fn rename(&self, src: &str, dest: &str) -> Result<()> {
        let src_path = self.entry_path(src)?;
        let dest_path = self.entry_path(dest)?;
        if !src_path.is_file() {
            return Err(StnoError::NotFound(src.to_string()));
        }
        if dest_path.exists() {
            return Err(StnoError::AlreadyExists(dest.to_string()));
        }
        self.ensure_parent(&dest_path)?;
        fs::rename(&src_path, &dest_path).map_err(StnoError::Io)?;
        debug!(src, dest, "renamed entry");
        Ok(())
    }

    fn exists(&self, uid: &str) -> Result<bool> {
        Ok(self.entry_path(uid)?.is_file())
    }
}
