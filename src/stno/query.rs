//! # Query
//!
//! A query reads every entry of a store and merges the parsed documents into
//! one aggregate [`Document`] keyed by uid:
//!
//! ```text
//! Listing ──▶ Fetching (worker pool) ──▶ Merging ──▶ Done
//! ```
//!
//! - **Listing** failures are fatal and returned to the caller.
//! - **Fetching** happens on a small pool of scoped threads. Each worker owns
//!   the reader it opens and the document it parses until it hands the pair
//!   to the merger over a bounded channel.
//! - **Merging** is single-threaded. An entry that could not be opened or
//!   parsed is recorded in [`QueryResult::skipped`] and logged; the query
//!   still completes. Filters run here, before insertion.
//!
//! Results arrive in completion order, so the key order of the aggregate is
//! not deterministic unless [`Query::sorted`] is set.
//!
//! Stopping early (see [`Query::limit`]) closes an abort channel. Workers
//! check it before fetching the next entry and while waiting to hand over a
//! result, and exit without doing further work.

use crate::document::{value_text, Document};
use crate::error::{Result, StnoError};
use crate::store::EntryStore;
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TryRecvError};
use std::thread;
use tracing::{debug, warn};

/// Decides whether a parsed entry is part of the result, and in what shape.
/// Returning `None` excludes the entry; it is not an error.
pub trait EntryFilter {
    fn apply(&self, uid: &str, document: Document) -> Option<Document>;
}

impl<F> EntryFilter for F
where
    F: Fn(&str, Document) -> Option<Document>,
{
    fn apply(&self, uid: &str, document: Document) -> Option<Document> {
        self(uid, document)
    }
}

/// Equality clauses on top-level fields plus an optional projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    equals: Vec<(String, String)>,
    fields: Vec<String>,
}

impl FieldFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps entries whose `key` has the text form `value`.
    pub fn where_eq(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push((key.into(), value.into()));
        self
    }

    /// Parses a `key=value` clause.
    pub fn where_clause(self, clause: &str) -> Result<Self> {
        let (key, value) = clause
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| StnoError::Api(format!("Invalid filter '{}', expected KEY=VALUE", clause)))?;
        Ok(self.where_eq(key.trim(), value.trim()))
    }

    /// Restricts each result to the listed top-level fields.
    pub fn select<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty() && self.fields.is_empty()
    }
}

impl EntryFilter for FieldFilter {
    fn apply(&self, _uid: &str, document: Document) -> Option<Document> {
        let matches = self.equals.iter().all(|(key, expected)| {
            document
                .get(key)
                .is_some_and(|value| &value_text(value) == expected)
        });
        if !matches {
            return None;
        }
        if self.fields.is_empty() {
            Some(document)
        } else {
            Some(document.project(&self.fields))
        }
    }
}

/// An entry that could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub uid: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct QueryResult {
    /// Aggregate document: one table per entry, keyed by uid.
    pub document: Document,
    pub skipped: Vec<Skipped>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

type Fetched = (String, Result<Document>);

pub struct Query<'q, S: EntryStore> {
    store: &'q S,
    prefix: String,
    section: Option<String>,
    filter: Option<Box<dyn EntryFilter + 'q>>,
    limit: Option<usize>,
    workers: usize,
    sorted: bool,
}

impl<'q, S: EntryStore> Query<'q, S> {
    pub fn new(store: &'q S) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            store,
            prefix: String::new(),
            section: None,
            filter: None,
            limit: None,
            workers,
            sorted: false,
        }
    }

    /// Only entries whose uid starts with `prefix`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Only entries below the section `path` (`work` or `work/2020`). The
    /// aggregate still uses full uids.
    pub fn section(mut self, path: impl Into<String>) -> Self {
        let path = path.into().trim_matches('/').to_string();
        self.section = (!path.is_empty()).then_some(path);
        self
    }

    pub fn filter<F: EntryFilter + 'q>(mut self, filter: F) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Stops after `n` entries have been merged.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    /// Sorts the aggregate by uid once merging is done.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    pub fn run(&self) -> Result<QueryResult> {
        let uids = self.list()?;
        let mut result = QueryResult::default();
        if uids.is_empty() || self.limit == Some(0) {
            return Ok(result);
        }

        let workers = self.workers.min(uids.len());
        debug!(entries = uids.len(), workers, "running query");

        let (job_tx, job_rx) = unbounded::<String>();
        for uid in uids {
            if job_tx.send(uid).is_err() {
                break;
            }
        }
        drop(job_tx);

        let (result_tx, result_rx) = bounded::<Fetched>(workers);
        // Never sent on: dropping the sender is the abort broadcast.
        let (abort_tx, abort_rx) = bounded::<()>(0);

        thread::scope(|scope| {
            for _ in 0..workers {
                let store = self.store;
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                let abort = abort_rx.clone();
                scope.spawn(move || fetch_entries(store, jobs, results, abort));
            }
            drop(result_tx);

            self.merge(&result_rx, &mut result);

            drop(abort_tx);
            drop(result_rx);
        });

        if self.sorted {
            result.document.sort_keys();
        }
        debug!(
            merged = result.len(),
            skipped = result.skipped.len(),
            "query finished"
        );
        Ok(result)
    }

    fn list(&self) -> Result<Vec<String>> {
        let Some(section) = &self.section else {
            return self.store.list_entries(&self.prefix);
        };
        let first = section.split('/').next().unwrap_or_default();
        let below = format!("{}/", section);
        Ok(self
            .store
            .list_entries(first)?
            .into_iter()
            .filter(|uid| {
                uid.strip_prefix(&below)
                    .is_some_and(|rest| rest.starts_with(&self.prefix))
            })
            .collect())
    }

    fn merge(&self, results: &Receiver<Fetched>, result: &mut QueryResult) {
        for (uid, outcome) in results.iter() {
            let document = match outcome {
                Ok(document) => document,
                Err(e) => {
                    warn!(uid = %uid, error = %e, "skipping unreadable entry");
                    result.skipped.push(Skipped {
                        uid,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let document = match &self.filter {
                Some(filter) => match filter.apply(&uid, document) {
                    Some(document) => document,
                    None => continue,
                },
                None => document,
            };

            result.document.insert(uid, document);
            if self.limit.is_some_and(|limit| result.len() >= limit) {
                break;
            }
        }
    }
}

/// Runs an unfiltered query over the whole store.
pub fn run<S: EntryStore>(store: &S) -> Result<QueryResult> {
    Query::new(store).run()
}

fn fetch_entries<S: EntryStore>(
    store: &S,
    jobs: Receiver<String>,
    results: Sender<Fetched>,
    abort: Receiver<()>,
) {
    for uid in jobs.iter() {
        if matches!(abort.try_recv(), Err(TryRecvError::Disconnected)) {
            return;
        }

        let outcome = store
            .new_entry_reader(&uid)
            .and_then(|reader| Document::from_reader(reader));

        select! {
            send(results, (uid, outcome)) -> sent => {
                if sent.is_err() {
                    return;
                }
            }
            recv(abort) -> _ => return,
        }
    }
}
