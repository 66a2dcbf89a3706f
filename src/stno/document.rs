//! Structured entry content.
//!
//! Entries are TOML documents: an ordered table of typed values (strings,
//! integers, floats, booleans, datetimes, arrays and nested tables).
//! [`Document`] wraps a [`toml::Table`] and adds the few operations the rest
//! of the crate needs: parsing, serialization, projection, and conversion into
//! a template context.

use crate::error::Result;
use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document(Table);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        let table = text.parse::<Table>()?;
        Ok(Self(table))
    }

    /// Reads the reader to the end and parses the whole contents.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(&self.0)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps only the listed top-level keys, in document order.
    pub fn project<S: AsRef<str>>(&self, fields: &[S]) -> Self {
        let table = self
            .0
            .iter()
            .filter(|(key, _)| fields.iter().any(|f| f.as_ref() == key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self(table)
    }

    /// Sorts top-level keys lexicographically.
    pub fn sort_keys(&mut self) {
        let mut entries: Vec<(String, Value)> = std::mem::take(&mut self.0).into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        self.0 = entries.into_iter().collect();
    }

    /// Builds a template context where every value keeps its type, except
    /// datetimes which become their RFC 3339 text.
    pub fn to_template_value(&self) -> minijinja::Value {
        table_value(&self.0)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }
}

impl From<Table> for Document {
    fn from(table: Table) -> Self {
        Self(table)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Table(doc.0)
    }
}

impl FromStr for Document {
    type Err = crate::error::StnoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Text form of a value for comparisons: strings are unquoted, everything
/// else uses its TOML representation.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Datetime(dt) => dt.to_string(),
        other => other.to_string(),
    }
}

fn table_value(table: &Table) -> minijinja::Value {
    let map: BTreeMap<String, minijinja::Value> = table
        .iter()
        .map(|(key, value)| (key.clone(), template_value(value)))
        .collect();
    minijinja::Value::from(map)
}

fn template_value(value: &Value) -> minijinja::Value {
    match value {
        Value::String(s) => minijinja::Value::from(s.clone()),
        Value::Integer(i) => minijinja::Value::from(*i),
        Value::Float(f) => minijinja::Value::from(*f),
        Value::Boolean(b) => minijinja::Value::from(*b),
        Value::Datetime(dt) => minijinja::Value::from(dt.to_string()),
        Value::Array(items) => {
            minijinja::Value::from(items.iter().map(template_value).collect::<Vec<_>>())
        }
        Value::Table(t) => table_value(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StnoError;

    const SAMPLE: &str = r#"
title = "Team Sync"
datetime = 2020-01-01T00:00:00Z
notes = """
first line
second line"""
attendees = ["ana", "bo"]
rating = 4
score = 0.5
done = true

[location]
room = "B12"
floor = 3
"#;

    #[test]
    fn test_parse_keeps_key_order() {
        let doc = Document::parse(SAMPLE).unwrap();
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(
            keys,
            vec!["title", "datetime", "notes", "attendees", "rating", "score", "done", "location"]
        );
    }

    #[test]
    fn test_reparse_of_serialized_document_is_equal() {
        let doc = Document::parse(SAMPLE).unwrap();
        let text = doc.to_toml_string().unwrap();
        let reparsed = Document::parse(&text).unwrap();
        assert_eq!(doc, reparsed);
        assert!(matches!(reparsed.get("datetime"), Some(Value::Datetime(_))));
    }

    #[test]
    fn test_invalid_text_is_a_parse_error() {
        let err = Document::parse("! invalid TOML").unwrap_err();
        assert!(matches!(err, StnoError::Parse(_)));
    }

    #[test]
    fn test_from_reader_reads_whole_input() {
        let doc = Document::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.len(), 8);
    }

    #[test]
    fn test_project_keeps_only_requested_fields() {
        let doc = Document::parse(SAMPLE).unwrap();
        let projected = doc.project(&["rating", "title", "missing"]);
        let keys: Vec<_> = projected.keys().collect();
        assert_eq!(keys, vec!["title", "rating"]);
    }

    #[test]
    fn test_sort_keys_orders_lexicographically() {
        let mut doc = Document::parse("b = 1\nc = 2\na = 3").unwrap();
        doc.sort_keys();
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_template_value_exposes_datetime_as_text() {
        let doc = Document::parse(SAMPLE).unwrap();
        let ctx = doc.to_template_value();
        let datetime = ctx.get_attr("datetime").unwrap();
        assert_eq!(datetime.as_str(), Some("2020-01-01T00:00:00Z"));
        let room = ctx.get_attr("location").unwrap().get_attr("room").unwrap();
        assert_eq!(room.as_str(), Some("B12"));
    }

    #[test]
    fn test_value_text_unquotes_strings() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(value_text(doc.get("title").unwrap()), "Team Sync");
        assert_eq!(value_text(doc.get("rating").unwrap()), "4");
        assert_eq!(value_text(doc.get("done").unwrap()), "true");
        assert_eq!(
            value_text(doc.get("datetime").unwrap()),
            "2020-01-01T00:00:00Z"
        );
    }
}
