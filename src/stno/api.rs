//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for stno operations, regardless of the UI being used.
//!
//! The facade:
//! - **Dispatches** to the appropriate command function
//! - **Carries session settings** (config location, query pool size)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no terminal I/O and holds no business logic. Interactive flows
//! such as "edit, then retry on a parse error" are driven by the UI on top of
//! [`StnoApi::entry_template_text`] and [`StnoApi::add_entry`].
//!
//! `StnoApi<S: EntryStore>` is generic over the storage backend:
//! - Production: `StnoApi<FileStore>`
//! - Testing: `StnoApi<InMemoryStore>`

use crate::commands;
use crate::error::Result;
use crate::notebook::Notebook;
use crate::store::EntryStore;
use std::path::{Path, PathBuf};

/// The main API facade for stno operations.
pub struct StnoApi<S: EntryStore> {
    notebook: Notebook<S>,
    config_dir: PathBuf,
    query_workers: Option<usize>,
}

impl<S: EntryStore> StnoApi<S> {
    pub fn new(notebook: Notebook<S>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            notebook,
            config_dir: config_dir.into(),
            query_workers: None,
        }
    }

    pub fn with_query_workers(mut self, workers: Option<usize>) -> Self {
        self.query_workers = workers;
        self
    }

    pub fn notebook(&self) -> &Notebook<S> {
        &self.notebook
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn entry_template_text(&self) -> Result<String> {
        commands::add::seed(&self.notebook)
    }

    pub fn add_entry(&self, text: &str) -> Result<commands::CmdResult> {
        commands::add::run(&self.notebook, text)
    }

    pub fn entry_source(&self, uid: &str) -> Result<String> {
        commands::edit::source(&self.notebook, uid)
    }

    pub fn update_entry(&self, uid: &str, text: &str) -> Result<commands::CmdResult> {
        commands::edit::run(&self.notebook, uid, text)
    }

    pub fn view_entries<I: AsRef<str>>(&self, uids: &[I]) -> Result<commands::CmdResult> {
        commands::view::run(&self.notebook, uids)
    }

    pub fn list_entries(&self, prefix: Option<&str>) -> Result<commands::CmdResult> {
        commands::list::run(&self.notebook, prefix.unwrap_or_default())
    }

    pub fn query(&self, mut options: QueryOptions) -> Result<commands::CmdResult> {
        if options.workers.is_none() {
            options.workers = self.query_workers;
        }
        commands::query::run(self.notebook.store(), options)
    }

    pub fn remove_entries<I: AsRef<str>>(&self, uids: &[I]) -> Result<commands::CmdResult> {
        commands::remove::run(&self.notebook, uids)
    }

    pub fn rename_entry(&self, src: &str, dest: &str) -> Result<commands::CmdResult> {
        commands::rename::run(&self.notebook, src, dest)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.config_dir, action)
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::query::QueryOptions;
pub use crate::query::FieldFilter;
pub use commands::{CmdMessage, CmdResult, ListedEntry, MessageLevel};
