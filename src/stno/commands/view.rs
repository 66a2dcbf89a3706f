use crate::commands::{CmdResult, ListedEntry};
use crate::error::Result;
use crate::notebook::Notebook;
use crate::store::EntryStore;

pub fn run<S: EntryStore, I: AsRef<str>>(notebook: &Notebook<S>, uids: &[I]) -> Result<CmdResult> {
    let entries = uids
        .iter()
        .map(|uid| {
            let uid = uid.as_ref();
            let entry = notebook.load_entry(uid)?;
            Ok(ListedEntry {
                uid: uid.to_string(),
                document: entry.into_document(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CmdResult::default().with_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StnoError;
    use crate::notebook::tests::notebook;

    #[test]
    fn test_returns_entries_in_requested_order() {
        let nb = notebook();
        nb.store().insert_raw("a", "title = \"A\"");
        nb.store().insert_raw("b", "title = \"B\"");

        let result = run(&nb, &["b", "a"]).unwrap();
        let uids: Vec<_> = result.entries.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["b", "a"]);
        assert_eq!(
            result.entries[0].document.get("title").and_then(|v| v.as_str()),
            Some("B")
        );
    }

    #[test]
    fn test_missing_entry_fails() {
        let nb = notebook();
        nb.store().insert_raw("a", "title = \"A\"");
        assert!(matches!(run(&nb, &["a", "zz"]), Err(StnoError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_entry_fails_with_parse_error() {
        let nb = notebook();
        nb.store().insert_raw("bad", "title = ");
        assert!(matches!(run(&nb, &["bad"]), Err(StnoError::Parse(_))));
    }
}
