use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::notebook::Notebook;
use crate::store::EntryStore;

pub fn run<S: EntryStore>(notebook: &Notebook<S>, src: &str, dest: &str) -> Result<CmdResult> {
    notebook.rename_entry(src, dest)?;
    let mut result = CmdResult::default().with_affected_uids(vec![dest.to_string()]);
    result.add_message(CmdMessage::success(format!("Entry renamed: {} -> {}", src, dest)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StnoError;
    use crate::notebook::tests::notebook;

    #[test]
    fn test_moves_entry_into_section() {
        let nb = notebook();
        nb.store().insert_raw("standup", "title = \"s\"");

        let result = run(&nb, "standup", "work/standup").unwrap();
        assert_eq!(result.affected_uids, vec!["work/standup"]);
        assert_eq!(nb.list_entries("").unwrap(), vec!["work/standup"]);
        assert_eq!(nb.store().raw("work/standup").as_deref(), Some("title = \"s\""));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let nb = notebook();
        nb.store().insert_raw("a", "1");
        nb.store().insert_raw("b", "2");
        assert!(matches!(run(&nb, "a", "b"), Err(StnoError::AlreadyExists(_))));
        assert_eq!(nb.store().raw("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_rejects_escaping_destination() {
        let nb = notebook();
        nb.store().insert_raw("a", "1");
        assert!(matches!(
            run(&nb, "a", "../outside"),
            Err(StnoError::InvalidIdentifier(_))
        ));
    }
}
