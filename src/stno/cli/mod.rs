//! # CLI Layer
//!
//! One possible UI client for stno. This is the only place that:
//! - Knows about terminal I/O (stdout, stderr, the editor)
//! - Handles argument parsing
//! - Installs the log subscriber
//!
//! ## Structure
//!
//! - `args`: clap definitions
//! - `handlers`: `run()` plus one `handle_*()` per command, calling the API
//! - `print`: turns `CmdResult`s into terminal output

mod args;
mod handlers;
mod print;

pub use handlers::run;
