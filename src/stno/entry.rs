use crate::document::Document;
use crate::error::Result;
use crate::notebook::Notebook;
use crate::store::EntryStore;
use std::io::{Read, Write};
use toml::Value;
use tracing::{debug, warn};

/// A notebook entry: a [`Document`] bound to the notebook that created it and,
/// once saved, to the uid of its backing file.
///
/// Content only changes wholesale, through [`Entry::set_document`] or one of
/// the load methods.
pub struct Entry<'n, S: EntryStore> {
    notebook: &'n Notebook<S>,
    document: Document,
    uid: Option<String>,
}

impl<'n, S: EntryStore> Entry<'n, S> {
    pub(crate) fn new(notebook: &'n Notebook<S>, document: Document) -> Self {
        Self {
            notebook,
            document,
            uid: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn set_document(&mut self, document: Document) {
        self.document = document;
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.document.keys()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        self.document.to_toml_string()
    }

    /// Replaces the content with the parsed contents of `reader`. On a parse
    /// error the previous content is kept.
    pub fn load_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        self.document = Document::from_reader(reader)?;
        Ok(())
    }

    pub fn load_str(&mut self, text: &str) -> Result<()> {
        self.document = Document::parse(text)?;
        Ok(())
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn set_uid(&mut self, uid: impl Into<String>) {
        self.uid = Some(uid.into());
    }

    /// Identifier seed derived from the current content. Not necessarily
    /// unique; see [`Notebook::entry_id`].
    pub fn id(&self) -> Result<String> {
        self.notebook.entry_id(&self.document)
    }

    /// Persists the entry and returns its uid.
    ///
    /// The first save derives the identifier and creates a new, store-unique
    /// file for it. Later saves overwrite that same file. If writing a newly
    /// created file fails, the file is removed again and the entry stays
    /// unsaved.
    pub fn save(&mut self) -> Result<String> {
        let body = self.document.to_toml_string()?;
        let store = self.notebook.store();

        if let Some(uid) = &self.uid {
            let mut writer = store.new_entry_writer(uid)?;
            writer.write_all(body.as_bytes())?;
            writer.flush()?;
            debug!(uid = %uid, "saved entry");
            return Ok(uid.clone());
        }

        let id = self.id()?;
        let (uid, mut writer) = store.new_unique_entry_writer(&id)?;
        let written = writer
            .write_all(body.as_bytes())
            .and_then(|_| writer.flush());
        drop(writer);

        if let Err(e) = written {
            if let Err(cleanup) = store.remove(&uid) {
                warn!(uid = %uid, error = %cleanup, "could not remove partially written entry");
            }
            return Err(e.into());
        }

        debug!(uid = %uid, "created entry");
        self.uid = Some(uid.clone());
        Ok(uid)
    }
}
