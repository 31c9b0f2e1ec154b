//! The in-memory task collection
//!
//! `TaskList` holds the commands that change the collection. It does no I/O;
//! persistence is layered on top by `store::TaskStore`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::TaskId;
use super::task::{validate_text, ParseError, Priority, Task, TaskUpdate, ValidationError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task ID already in use: {0}")]
    DuplicateId(TaskId),
}

/// Status filter applied before search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            _ => Err(ParseError::new("filter", s, "all, active, completed")),
        }
    }
}

/// Applies the status filter, then the case-insensitive substring search.
///
/// A query that is empty after trimming does not narrow the result.
pub fn filter_tasks(tasks: &[Task], filter: StatusFilter, query: &str) -> Vec<Task> {
    let needle = query.trim().to_lowercase();

    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .filter(|task| needle.is_empty() || task.matches(&needle))
        .cloned()
        .collect()
}

/// Completion counts over a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Whole-number percentage of completed tasks
    pub completion_rate: u8,
}

impl CompletionStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };

        Self {
            total,
            completed,
            active: total - completed,
            completion_rate,
        }
    }
}

/// Ordered task collection, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-validated collection, keeping its order
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &TaskId) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }

    /// Validates `text` and prepends a new task
    pub fn add(
        &mut self,
        id: TaskId,
        text: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<&Task, TaskError> {
        let text = validate_text(text)?;
        if self.contains(&id) {
            return Err(TaskError::DuplicateId(id));
        }

        self.tasks.insert(0, Task::new(id, text, priority, due_date, now));
        Ok(&self.tasks[0])
    }

    pub fn toggle(&mut self, id: &TaskId, now: DateTime<Utc>) -> Result<&Task, TaskError> {
        let task = self.get_mut(id)?;
        task.toggle(now);
        Ok(&*task)
    }

    /// Re-validates the text, then applies the edit
    pub fn update(
        &mut self,
        id: &TaskId,
        update: &TaskUpdate,
        now: DateTime<Utc>,
    ) -> Result<&Task, TaskError> {
        let text = validate_text(&update.text)?;
        let task = self.get_mut(id)?;
        task.apply(text, update, now);
        Ok(&*task)
    }

    pub fn set_priority(
        &mut self,
        id: &TaskId,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Result<&Task, TaskError> {
        let task = self.get_mut(id)?;
        task.set_priority(priority, now);
        Ok(&*task)
    }

    /// Removes a task, leaving the others in their relative order
    pub fn delete(&mut self, id: &TaskId) -> Result<Task, TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        Ok(self.tasks.remove(index))
    }

    /// Removes every completed task; returns how many were removed
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }

    pub fn filtered(&self, filter: StatusFilter, query: &str) -> Vec<Task> {
        filter_tasks(&self.tasks, filter, query)
    }

    pub fn stats(&self) -> CompletionStats {
        CompletionStats::from_tasks(&self.tasks)
    }
}
