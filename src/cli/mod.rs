//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `add`, `edit`, `priority` | Create and change tasks |
//! | `toggle`, `delete`, `clear-completed` | Complete and remove tasks |
//! | `list`, `stats` | Read the collection |
//! | `prefs` | Theme and animation preferences |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Warnings about unreadable or unsaved state go to stderr.
//!
//! ## Entry Point
//!
//! Parse a [`Cli`] and hand it to [`run()`].

mod app;
mod output;
mod prefs;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{pluralize_tasks, Output, OutputFormat};
