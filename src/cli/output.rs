//! Output formatting for CLI commands

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Task;
use crate::storage;
use crate::store::Notice;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints a non-fatal warning on stderr
    pub fn notice(&self, notice: &Notice) {
        match self.format {
            OutputFormat::Text => eprintln!("Warning: {}", notice),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "warning": notice.message }));
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        let json = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = json {
            println!("{}", json);
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// "1 task", "0 tasks", "12 tasks"
pub fn pluralize_tasks(count: usize) -> String {
    if count == 1 {
        "1 task".to_string()
    } else {
        format!("{} tasks", count)
    }
}

/// Short relative age: "just now", "5m ago", "3h ago", "2d ago", or the date
pub fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

/// One line of `list` output
pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{}] {}  {:<6}  {}",
        mark,
        task.id,
        task.priority.as_str(),
        task.text
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  (due {})", due));
    }
    line.push_str(&format!("  - {}", format_age(task.created_at, now)));
    line
}
