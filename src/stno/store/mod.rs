//! # Storage Layer
//!
//! This module defines the storage abstraction for stno. The [`EntryStore`]
//! trait maps entry identifiers (uids) to readable and writable byte streams.
//! It knows nothing about TOML or templates; those live in the notebook layer.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production file-based storage
//!   - One file per entry: `<dir>/<uid>.toml`
//!   - Subdirectories are sections, addressed as `section/uid`
//!
//! - [`memory::InMemoryStore`]: In-memory storage for testing
//!   - No persistence
//!   - Fast, isolated test execution
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! ~/.stno/
//! ├── config.json                          # Session configuration
//! └── default/                             # One directory per notebook
//!     ├── 2020-01-01T00-00-00Z-Team-Sync.toml
//!     ├── 2020-01-01T00-00-00Z-Team-Sync-0.toml
//!     └── work/                            # A section
//!         └── 2020-01-02T09-00-00Z-Standup.toml
//! ```
//!
//! ## Concurrency
//!
//! All operations take `&self` and implementations are `Send + Sync`, so the
//! query worker pool can read from one store concurrently. There is no locking
//! between processes: two writers of the same uid race and the last one wins.

use crate::error::{Result, StnoError};
use std::io::{Read, Write};

pub mod fs;
pub mod memory;
pub mod unique;

/// Extension of entry files, without the dot.
pub const ENTRY_EXT: &str = "toml";

/// Abstract interface for entry storage.
pub trait EntryStore: Send + Sync {
    type Reader: Read + Send;
    type Writer: Write;

    /// Lists uids whose first path component starts with `prefix`. Sections
    /// are listed recursively as `section/uid`. Order is unspecified.
    fn list_entries(&self, prefix: &str) -> Result<Vec<String>>;

    /// Opens an entry for reading. Fails with `NotFound` if it is absent.
    fn new_entry_reader(&self, uid: &str) -> Result<Self::Reader>;

    /// Creates or truncates an entry. No existence check: last writer wins.
    fn new_entry_writer(&self, uid: &str) -> Result<Self::Writer>;

    /// Creates a brand-new entry seeded by `prefix`. The returned uid is
    /// `prefix` itself when that name is free, otherwise `prefix` followed by
    /// a numeric suffix.
    fn new_unique_entry_writer(&self, prefix: &str) -> Result<(String, Self::Writer)>;

    /// Removes an entry. Fails with `NotFound` if it is absent.
    fn remove(&self, uid: &str) -> Result<()>;

    /// Renames an entry. Fails with `NotFound` if `src` is absent and with
    /// `AlreadyExists` if `dest` is taken.
    fn rename(&self, src: &str, dest: &str) -> Result<()>;

    fn exists(&self, uid: &str) -> Result<bool>;
}

/// Checks that a uid is a relative path made of normal components separated
/// by `/`. Returns the components.
///
/// Every name a store lists passes this check, so listed uids can always be
/// opened.
pub fn validate_uid(uid: &str) -> Result<Vec<&str>> {
    let invalid = || StnoError::InvalidIdentifier(uid.to_string());
    if uid.is_empty() || uid.contains('\\') || uid.contains('\0') {
        return Err(invalid());
    }
    let parts: Vec<&str> = uid.split('/').collect();
    if parts.iter().any(|p| !is_normal_component(p)) {
        return Err(invalid());
    }
    Ok(parts)
}

fn is_normal_component(part: &str) -> bool {
    if part.is_empty() || part == "." || part == ".." {
        return false;
    }
    // Drive prefixes and alternate data streams.
    !(cfg!(windows) && part.contains(':'))
}

/// Unique-name seeds never contain separators; identifiers derived from
/// templates are sanitized before they get here.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || prefix.contains('/') || prefix.contains('\\') {
        return Err(StnoError::InvalidIdentifier(prefix.to_string()));
    }
    validate_uid(prefix).map(|_| ())
}
