//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::prefs::{self, PrefsCommands};
use super::task;
use crate::domain::{DueDateChange, Priority, SortMode, StatusFilter, TaskId};
use crate::storage::{Config, FileStore};
use crate::store::TodoApp;

#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about = "A small, local to-do list")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding saved tasks and preferences
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task text
        text: String,

        /// low, medium or high (defaults to the configured priority)
        #[arg(long, short)]
        priority: Option<Priority>,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<NaiveDate>,
    },

    /// List tasks
    List {
        /// all, active or completed
        #[arg(long, default_value = "all")]
        filter: StatusFilter,

        /// Case-insensitive text to look for
        #[arg(long, short)]
        search: Option<String>,

        /// default, due-date or priority
        #[arg(long, default_value = "default")]
        sort: SortMode,
    },

    /// Mark a task completed, or active again
    Toggle {
        /// Task ID
        id: TaskId,
    },

    /// Replace a task's text, optionally changing priority and due date
    Edit {
        /// Task ID
        id: TaskId,

        /// New text
        text: String,

        #[arg(long, short)]
        priority: Option<Priority>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE", conflicts_with = "clear_due")]
        due: Option<NaiveDate>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Change a task's priority
    Priority {
        /// Task ID
        id: TaskId,

        /// low, medium or high
        priority: Priority,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,
    },

    /// Delete every completed task
    ClearCompleted,

    /// Show completion counts
    Stats,

    /// Show or change display preferences
    #[command(subcommand)]
    Prefs(PrefsCommands),
}

/// Executes a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or_else(|| config.default_format.into());
    let output = Output::new(format, cli.verbose);

    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref())?;
    output.verbose_ctx("storage", &format!("Data directory: {}", data_dir.display()));

    let mut app = TodoApp::open(FileStore::new(&data_dir));
    flush_notices(&mut app, &output);

    let result = dispatch(cli.command, &mut app, &output, &config);
    flush_notices(&mut app, &output);

    result
}

fn dispatch(
    command: Commands,
    app: &mut TodoApp,
    output: &Output,
    config: &Config,
) -> Result<()> {
    match command {
        Commands::Add {
            text,
            priority,
            due,
        } => {
            let priority = priority.unwrap_or(config.default_priority);
            task::add(app, output, &text, priority, due)
        }
        Commands::List {
            filter,
            search,
            sort,
        } => task::list(app, output, filter, search.as_deref(), sort),
        Commands::Toggle { id } => task::toggle(app, output, &id),
        Commands::Edit {
            id,
            text,
            priority,
            due,
            clear_due,
        } => {
            let due = match (due, clear_due) {
                (Some(date), _) => DueDateChange::Set(date),
                (None, true) => DueDateChange::Clear,
                (None, false) => DueDateChange::Keep,
            };
            task::edit(app, output, &id, &text, priority, due)
        }
        Commands::Priority { id, priority } => task::set_priority(app, output, &id, priority),
        Commands::Delete { id } => task::delete(app, output, &id),
        Commands::ClearCompleted => task::clear_completed(app, output),
        Commands::Stats => task::stats(app, output),
        Commands::Prefs(cmd) => prefs::run(cmd, app, output),
    }
}

fn flush_notices(app: &mut TodoApp, output: &Output) {
    for notice in app.take_notices() {
        output.notice(&notice);
    }
}
