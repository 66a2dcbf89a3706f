use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::{Result, StnoError};
use crate::notebook::Notebook;
use crate::store::EntryStore;
use std::io::Read;

/// Raw text of an existing entry, formatting and comments included.
pub fn source<S: EntryStore>(notebook: &Notebook<S>, uid: &str) -> Result<String> {
    let mut text = String::new();
    notebook
        .store()
        .new_entry_reader(uid)?
        .read_to_string(&mut text)?;
    Ok(text)
}

/// Replaces the content of `uid` with `text`. The identifier does not change,
/// even when the fields it was derived from did. The previous content does not
/// have to parse, so a corrupt entry can be repaired this way.
pub fn run<S: EntryStore>(notebook: &Notebook<S>, uid: &str, text: &str) -> Result<CmdResult> {
    let document = Document::parse(text)?;
    if !notebook.store().exists(uid)? {
        return Err(StnoError::NotFound(uid.to_string()));
    }
    let mut entry = notebook.entry_from(document);
    entry.set_uid(uid);
    let uid = entry.save()?;

    let mut result = CmdResult::default().with_affected_uids(vec![uid.clone()]);
    result.add_message(CmdMessage::success(format!("Entry updated: {}", uid)));
    Ok(result)
}
