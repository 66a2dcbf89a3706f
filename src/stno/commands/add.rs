use crate::commands::{CmdMessage, CmdResult};
use crate::document::Document;
use crate::error::Result;
use crate::notebook::Notebook;
use crate::store::EntryStore;

/// Text a new entry starts from: the rendered entry template.
pub fn seed<S: EntryStore>(notebook: &Notebook<S>) -> Result<String> {
    notebook.render_entry_template()
}

/// Parses `text` and saves it as a new entry. Nothing is written when the
/// text is not valid TOML.
pub fn run<S: EntryStore>(notebook: &Notebook<S>, text: &str) -> Result<CmdResult> {
    let document = Document::parse(text)?;
    let mut entry = notebook.entry_from(document);
    let uid = entry.save()?;

    let mut result = CmdResult::default().with_affected_uids(vec![uid.clone()]);
    result.add_message(CmdMessage::success(format!("Entry saved: {}", uid)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StnoError;
    use crate::notebook::tests::notebook;

    #[test]
    fn test_seed_is_rendered_template() {
        let nb = notebook();
        assert_eq!(
            seed(&nb).unwrap(),
            "title = \"\"\ndatetime = 2020-01-01T00:00:00Z\nnotes = \"\"\n"
        );
    }

    #[test]
    fn test_saves_new_entry() {
        let nb = notebook();
        let text = "title = \"Team Sync\"\ndatetime = 2020-01-01T00:00:00Z\n";
        let result = run(&nb, text).unwrap();

        assert_eq!(result.affected_uids, vec!["2020-01-01T00-00-00Z-Team-Sync"]);
        let stored = nb.store().raw("2020-01-01T00-00-00Z-Team-Sync").unwrap();
        assert_eq!(Document::parse(&stored).unwrap(), Document::parse(text).unwrap());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn test_same_content_twice_creates_two_entries() {
        let nb = notebook();
        let text = "title = \"Same\"";
        let a = run(&nb, text).unwrap();
        let b = run(&nb, text).unwrap();
        assert_eq!(a.affected_uids, vec!["no-value-Same"]);
        assert_eq!(b.affected_uids, vec!["no-value-Same-0"]);
    }

    #[test]
    fn test_invalid_text_writes_nothing() {
        let nb = notebook();
        assert!(matches!(run(&nb, "title = "), Err(StnoError::Parse(_))));
        assert!(nb.store().is_empty());
    }
}
