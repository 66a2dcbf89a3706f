use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::notebook::Notebook;
use crate::store::EntryStore;

/// Removes each entry in turn. Stops at the first uid that cannot be
/// removed; entries before it stay removed.
pub fn run<S: EntryStore, I: AsRef<str>>(notebook: &Notebook<S>, uids: &[I]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for uid in uids {
        let uid = uid.as_ref();
        notebook.remove_entry(uid)?;
        result.add_message(CmdMessage::success(format!("Entry removed: {}", uid)));
        result.affected_uids.push(uid.to_string());
    }
    Ok(result)
}
