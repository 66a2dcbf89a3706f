use super::unique::MAX_ATTEMPTS;
use super::{validate_prefix, validate_uid, EntryStore};
use crate::error::{Result, StnoError};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

type Entries = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    entries: Entries,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes under `uid`, bypassing any parsing.
    pub fn insert_raw(&self, uid: &str, content: &str) {
        lock(&self.entries).insert(uid.to_string(), content.as_bytes().to_vec());
    }

    /// Current raw content of `uid`, if present.
    pub fn raw(&self, uid: &str) -> Option<String> {
        lock(&self.entries)
            .get(uid)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn writer(&self, uid: String) -> MemWriter {
        MemWriter {
            uid,
            buf: Vec::new(),
            entries: Arc::clone(&self.entries),
        }
    }
}

fn lock(entries: &Entries) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Buffers writes and publishes them to the store on flush and on drop.
pub struct MemWriter {
    uid: String,
    buf: Vec<u8>,
    entries: Entries,
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        lock(&self.entries).insert(self.uid.clone(), self.buf.clone());
        Ok(())
    }
}

impl Drop for MemWriter {
    fn drop(&mut self) {
        // Removed while the writer was open: don't resurrect it.
        let mut entries = lock(&self.entries);
        if let Some(slot) = entries.get_mut(&self.uid) {
            *slot = std::mem::take(&mut self.buf);
        }
    }
}

impl EntryStore for InMemoryStore {
    type Reader = Cursor<Vec<u8>>;
    type Writer = MemWriter;

    fn list_entries(&self, prefix: &str) -> Result<Vec<String>> {
        if prefix.contains(['/', '\\']) {
            return Err(StnoError::InvalidIdentifier(prefix.to_string()));
        }
        Ok(lock(&self.entries)
            .keys()
            .filter(|uid| uid.split('/').next().is_some_and(|first| first.starts_with(prefix)))
            .cloned()
            .collect())
    }

    fn new_entry_reader(&self, uid: &str) -> Result<Self::Reader> {
        validate_uid(uid)?;
        lock(&self.entries)
            .get(uid)
            .cloned()
            .map(Cursor::new)
            .ok_or_else(|| StnoError::NotFound(uid.to_string()))
    }

    fn new_entry_writer(&self, uid: &str) -> Result<Self::Writer> {
        validate_uid(uid)?;
        lock(&self.entries).insert(uid.to_string(), Vec::new());
        Ok(self.writer(uid.to_string()))
    }

    fn new_unique_entry_writer(&self, prefix: &str) -> Result<(String, Self::Writer)> {
        validate_prefix(prefix)?;
        let mut entries = lock(&self.entries);

        let candidates = std::iter::once(prefix.to_string())
            .chain((0..MAX_ATTEMPTS).map(|i| format!("{}-{}", prefix, i)));
        for uid in candidates {
            if !entries.contains_key(&uid) {
                entries.insert(uid.clone(), Vec::new());
                drop(entries);
                let writer = self.writer(uid.clone());
                return Ok((uid, writer));
            }
        }

        Err(StnoError::Exhausted {
            dir: PathBuf::from("<memory>"),
            prefix: format!("{}-", prefix),
            attempts: MAX_ATTEMPTS,
        })
    }

    fn remove(&self, uid: &str) -> Result<()> {
        validate_uid(uid)?;
        lock(&self.entries)
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| StnoError::NotFound(uid.to_string()))
    }

    fn rename(&self, src: &str, dest: &str) -> Result<()> {
        validate_uid(src)?;
        validate_uid(dest)?;
        let mut entries = lock(&self.entries);
        if entries.contains_key(dest) {
            return Err(StnoError::AlreadyExists(dest.to_string()));
        }
        let content = entries
            .remove(src)
            .ok_or_else(|| StnoError::NotFound(src.to_string()))?;
        entries.insert(dest.to_string(), content);
        Ok(())
    }

    fn exists(&self, uid: &str) -> Result<bool> {
        validate_uid(uid)?;
        Ok(lock(&self.entries).contains_key(uid))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub const VALID_ENTRY: &str = "title = \"Standup\"\ndatetime = 2020-01-02T09:00:00Z\nnotes = \"\"\n";
    pub const CORRUPT_ENTRY: &str = "title = \"unterminated\ndatetime = \n";

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_entries(self, count: usize) -> Self {
            for i in 0..count {
                let text = format!(
                    "title = \"Entry {}\"\ndatetime = 2020-01-{:02}T00:00:00Z\nindex = {}\n",
                    i + 1,
                    i + 1,
                    i + 1
                );
                self.store.insert_raw(&format!("entry-{}", i + 1), &text);
            }
            self
        }

        pub fn with_entry(self, uid: &str, text: &str) -> Self {
            self.store.insert_raw(uid, text);
            self
        }

        pub fn with_corrupt_entries(self, count: usize) -> Self {
            for i in 0..count {
                self.store
                    .insert_raw(&format!("corrupt-{}", i + 1), CORRUPT_ENTRY);
            }
            self
        }
    }
}
