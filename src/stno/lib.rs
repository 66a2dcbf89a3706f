//! # Stno Architecture
//!
//! Stno is a **structured notebook library**: every entry is a small TOML
//! document stored as one file, named from its own content through a template.
//! It is a library that happens to have a CLI client, not the other way round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, runs the editor, formats output        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One function per user action, returns CmdResult          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (notebook.rs, entry.rs, query.rs, template.rs)        │
//! │  - Templates, identifier derivation, concurrent queries     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract EntryStore trait                                │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//!
//! An entry's identifier is derived once, on its first save, by rendering the
//! notebook's entry ID template with the entry's fields and sanitizing the
//! result. Collisions get a numeric suffix (`-0`, `-1`, ...). Later edits never
//! rename the file.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr, never calls
//! `std::process::exit` and never assumes a terminal. Diagnostics go through
//! `tracing`; the binary decides where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: One module per user action
//! - [`notebook`], [`entry`]: Templates applied to stored entries
//! - [`query`]: Concurrent aggregation of a whole notebook
//! - [`document`]: TOML documents
//! - [`template`]: Template compilation, rendering and identifier sanitizing
//! - [`store`]: Storage abstraction, implementations and the unique file allocator
//! - [`config`]: Configuration management
//! - [`init`]: Locating the stno root and opening a notebook
//! - [`editor`]: External editor integration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod document;
pub mod editor;
pub mod entry;
pub mod error;
pub mod init;
pub mod notebook;
pub mod query;
pub mod store;
pub mod template;
