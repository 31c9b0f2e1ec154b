//! Task domain model
//!
//! A task is a single to-do item: text, completion flag, priority,
//! timestamps and an optional due date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::TaskId;

/// Maximum task text length, in characters, after trimming
pub const MAX_TEXT_LEN: usize = 500;

/// Reason a task text was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task cannot be empty")]
    Empty,

    #[error("Task is too long (max {max} characters)")]
    TooLong { len: usize, max: usize },
}

/// Failure to parse one of the enumerated domain values from a string
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Trims `text` and checks it is 1..=500 characters long
pub fn validate_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let len = trimmed.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_TEXT_LEN,
        });
    }

    Ok(trimmed.to_string())
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: high sorts first, low last
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseError::new("priority", s, "low, medium, high")),
        }
    }
}

/// What an edit does to the due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueDateChange {
    /// Leave the current due date alone
    #[default]
    Keep,
    /// Remove the due date
    Clear,
    /// Replace the due date
    Set(NaiveDate),
}

/// An edit to an existing task
///
/// Text is always supplied and re-validated; priority and due date are
/// only touched when asked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub text: String,
    pub priority: Option<Priority>,
    pub due_date: DueDateChange,
}

impl TaskUpdate {
    /// An edit that only changes the text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: None,
            due_date: DueDateChange::Keep,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due_date(mut self, change: DueDateChange) -> Self {
        self.due_date = change;
        self
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Trimmed, non-empty text
    pub text: String,

    pub completed: bool,

    #[serde(default)]
    pub priority: Priority,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last changed
    pub updated_at: DateTime<Utc>,

    /// Optional deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Creates a new, incomplete task. `text` is expected to be validated already.
    pub fn new(
        id: TaskId,
        text: impl Into<String>,
        priority: Priority,
        due_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            priority,
            created_at: now,
            updated_at: now,
            due_date,
        }
    }

    /// Flips the completion flag
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.touch(now);
    }

    /// Applies a validated edit
    pub fn apply(&mut self, text: String, update: &TaskUpdate, now: DateTime<Utc>) {
        self.text = text;
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        match update.due_date {
            DueDateChange::Keep => {}
            DueDateChange::Clear => self.due_date = None,
            DueDateChange::Set(date) => self.due_date = Some(date),
        }
        self.touch(now);
    }

    pub fn set_priority(&mut self, priority: Priority, now: DateTime<Utc>) {
        self.priority = priority;
        self.touch(now);
    }

    /// Returns true if the text matches `needle` case-insensitively.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
    }

    // updated_at never goes behind created_at, even if the clock does
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
