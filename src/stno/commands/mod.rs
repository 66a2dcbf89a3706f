use crate::config::StnoConfig;
use crate::document::Document;

pub mod add;
pub mod config;
pub mod edit;
pub mod list;
pub mod query;
pub mod remove;
pub mod rename;
pub mod view;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// An entry returned for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedEntry {
    pub uid: String,
    pub document: Document,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Entries created, changed or removed by the command
    pub affected_uids: Vec<String>,
    /// Identifiers to print, in order
    pub listed_uids: Vec<String>,
    pub entries: Vec<ListedEntry>,
    /// Aggregate produced by a query
    pub document: Option<Document>,
    pub config: Option<StnoConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_uids(mut self, uids: Vec<String>) -> Self {
        self.affected_uids = uids;
        self
    }

    pub fn with_listed_uids(mut self, uids: Vec<String>) -> Self {
        self.listed_uids = uids;
        self
    }

    pub fn with_entries(mut self, entries: Vec<ListedEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_config(mut self, config: StnoConfig) -> Self {
        self.config = Some(config);
        self
    }
}
