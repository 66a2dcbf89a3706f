//! # Notebook
//!
//! A [`Notebook`] combines an [`EntryStore`] with two templates:
//!
//! - The **entry template** produces the initial text of a new entry. It is
//!   rendered with a single variable, `datetime`, holding the current time in
//!   RFC 3339 form.
//! - The **entry ID template** produces the seed of an entry's identifier. It
//!   is rendered with the parsed content of the entry, and the result is
//!   passed through [`sanitize_identifier`].
//!
//! Identifiers are not unique by construction. Two entries that render to the
//! same seed are told apart when they are saved: the store appends a numeric
//! suffix only when the plain name is taken.
//!
//! Template overrides are validated when they are set, so a broken template is
//! reported at configuration time rather than in the middle of saving.

use crate::document::Document;
use crate::entry::Entry;
use crate::error::Result;
use crate::store::EntryStore;
use crate::template::{sanitize_identifier, Template};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use once_cell::sync::Lazy;
use tracing::debug;

pub const DEFAULT_ENTRY_TEMPLATE: &str = "title = \"\"\ndatetime = {{ datetime }}\nnotes = \"\"\n";
pub const DEFAULT_ENTRY_ID_TEMPLATE: &str = "{{ datetime }}-{{ title }}";

const ENTRY_TEMPLATE_NAME: &str = "entry";
const ENTRY_ID_TEMPLATE_NAME: &str = "entry_id";

static BUILTIN_ENTRY_TEMPLATE: Lazy<Template> = Lazy::new(|| {
    Template::compile(ENTRY_TEMPLATE_NAME, DEFAULT_ENTRY_TEMPLATE)
        .expect("built-in entry template compiles")
});

static BUILTIN_ENTRY_ID_TEMPLATE: Lazy<Template> = Lazy::new(|| {
    Template::compile(ENTRY_ID_TEMPLATE_NAME, DEFAULT_ENTRY_ID_TEMPLATE)
        .expect("built-in entry ID template compiles")
});

/// Source of the `datetime` value for new entries.
pub type Clock = fn() -> DateTime<FixedOffset>;

fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub struct Notebook<S: EntryStore> {
    store: S,
    entry_template: Template,
    entry_id_template: Template,
    clock: Clock,
}

impl<S: EntryStore> Notebook<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entry_template: BUILTIN_ENTRY_TEMPLATE.clone(),
            entry_id_template: BUILTIN_ENTRY_ID_TEMPLATE.clone(),
            clock: local_now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entry_template(&self) -> &Template {
        &self.entry_template
    }

    pub fn entry_id_template(&self) -> &Template {
        &self.entry_id_template
    }

    /// Replaces the template used to seed new entries.
    pub fn set_entry_template(&mut self, source: &str) -> Result<()> {
        self.entry_template = Template::compile(ENTRY_TEMPLATE_NAME, source)?;
        Ok(())
    }

    /// Replaces the template used to derive entry identifiers.
    pub fn set_entry_id_template(&mut self, source: &str) -> Result<()> {
        self.entry_id_template = Template::compile(ENTRY_ID_TEMPLATE_NAME, source)?;
        Ok(())
    }

    /// Values available to the entry template.
    pub fn template_data(&self) -> minijinja::Value {
        let now = (self.clock)();
        minijinja::context! {
            datetime => now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Renders the entry template without parsing it. This is the text an
    /// editor is seeded with.
    pub fn render_entry_template(&self) -> Result<String> {
        self.entry_template.render(self.template_data())
    }

    /// Creates an unsaved entry from the entry template.
    pub fn new_entry(&self) -> Result<Entry<'_, S>> {
        let text = self.render_entry_template()?;
        let document = Document::parse(&text)?;
        Ok(Entry::new(self, document))
    }

    /// Wraps already parsed content in an unsaved entry.
    pub fn entry_from(&self, document: Document) -> Entry<'_, S> {
        Entry::new(self, document)
    }

    /// Derives the identifier seed for `document`. Pure: the same document and
    /// template always give the same result.
    pub fn entry_id(&self, document: &Document) -> Result<String> {
        let raw = self.entry_id_template.render(document.to_template_value())?;
        let id = sanitize_identifier(&raw);
        debug!(raw = %raw, id = %id, "derived entry id");
        Ok(id)
    }

    /// Loads a persisted entry. The returned entry keeps `uid`, so saving it
    /// overwrites the same file.
    pub fn load_entry(&self, uid: &str) -> Result<Entry<'_, S>> {
        let reader = self.store.new_entry_reader(uid)?;
        let mut entry = Entry::new(self, Document::new());
        entry.load_reader(reader)?;
        entry.set_uid(uid);
        Ok(entry)
    }

    pub fn list_entries(&self, prefix: &str) -> Result<Vec<String>> {
        self.store.list_entries(prefix)
    }

    pub fn remove_entry(&self, uid: &str) -> Result<()> {
        self.store.remove(uid)
    }

    pub fn rename_entry(&self, src: &str, dest: &str) -> Result<()> {
        self.store.rename(src, dest)
    }
}
