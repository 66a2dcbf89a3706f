use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::query::{FieldFilter, Query};
use crate::store::EntryStore;

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Section below the notebook, e.g. `work` or `work/2020`
    pub section: Option<String>,
    pub filter: FieldFilter,
    pub limit: Option<usize>,
    pub workers: Option<usize>,
}

/// Aggregates all readable entries into one document, sorted by uid.
/// Entries that cannot be read or parsed are reported as warnings.
pub fn run<S: EntryStore>(store: &S, options: QueryOptions) -> Result<CmdResult> {
    let mut query = Query::new(store).sorted(true);
    if let Some(section) = options.section {
        query = query.section(section);
    }
    if let Some(limit) = options.limit {
        query = query.limit(limit);
    }
    if let Some(workers) = options.workers {
        query = query.workers(workers);
    }
    if !options.filter.is_empty() {
        query = query.filter(options.filter);
    }

    let outcome = query.run()?;
    let mut result = CmdResult::default();
    for skipped in &outcome.skipped {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {}: {}",
            skipped.uid, skipped.reason
        )));
    }
    result.listed_uids = outcome.document.keys().map(String::from).collect();
    Ok(result.with_document(outcome.document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_aggregates_sorted_and_reports_skips() {
        let fixture = StoreFixture::new().with_entries(3).with_corrupt_entries(2);
        let result = run(&fixture.store, QueryOptions::default()).unwrap();

        assert_eq!(result.listed_uids, vec!["entry-1", "entry-2", "entry-3"]);
        assert_eq!(result.document.as_ref().map(|d| d.len()), Some(3));
        assert_eq!(result.messages.len(), 2);
        assert!(result
            .messages
            .iter()
            .all(|m| m.level == crate::commands::MessageLevel::Warning));
    }

    #[test]
    fn test_filter_and_limit() {
        let fixture = StoreFixture::new().with_entries(5);
        let options = QueryOptions {
            filter: FieldFilter::new().select(["title"]),
            limit: Some(2),
            workers: Some(1),
            ..Default::default()
        };
        let result = run(&fixture.store, options).unwrap();
        let document = result.document.unwrap();
        assert_eq!(document.len(), 2);
        let text = document.to_toml_string().unwrap();
        assert!(!text.contains("index"));
    }

    #[test]
    fn test_section_option() {
        let fixture = StoreFixture::new()
            .with_entries(2)
            .with_entry("work/retro", "title = \"r\"");
        let options = QueryOptions {
            section: Some("work".to_string()),
            ..Default::default()
        };
        let result = run(&fixture.store, options).unwrap();
        assert_eq!(result.listed_uids, vec!["work/retro"]);
    }
}
