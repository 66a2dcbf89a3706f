use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::notebook::Notebook;
use crate::store::EntryStore;

/// Identifiers of all entries whose first path component starts with
/// `prefix`, sorted.
pub fn run<S: EntryStore>(notebook: &Notebook<S>, prefix: &str) -> Result<CmdResult> {
    let mut uids = notebook.list_entries(prefix)?;
    uids.sort();

    let mut result = CmdResult::default();
    if uids.is_empty() {
        result.add_message(CmdMessage::info("No entries found."));
    }
    Ok(result.with_listed_uids(uids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::tests::notebook;

    #[test]
    fn test_lists_sorted() {
        let nb = notebook();
        nb.store().insert_raw("b", "");
        nb.store().insert_raw("a", "");
        nb.store().insert_raw("work/c", "");

        let result = run(&nb, "").unwrap();
        assert_eq!(result.listed_uids, vec!["a", "b", "work/c"]);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_prefix_narrows() {
        let nb = notebook();
        nb.store().insert_raw("2020-a", "");
        nb.store().insert_raw("2021-b", "");
        let result = run(&nb, "2021").unwrap();
        assert_eq!(result.listed_uids, vec!["2021-b"]);
    }

    #[test]
    fn test_empty_notebook_says_so() {
        let nb = notebook();
        let result = run(&nb, "").unwrap();
        assert!(result.listed_uids.is_empty());
        assert_eq!(result.messages[0].content, "No entries found.");
    }
}
