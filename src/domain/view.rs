//! View state and the visible-list selector
//!
//! The view state is orthogonal to the tasks: which status is shown, how the
//! result is ordered, what the search box holds, and the visual preferences.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::list::{filter_tasks, StatusFilter};
use super::task::{ParseError, Task};

/// Secondary ordering applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Insertion order (newest first)
    #[default]
    Default,
    /// Earliest due date first, undated tasks last
    DueDate,
    /// High, then medium, then low
    Priority,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Default => "default",
            SortMode::DueDate => "due-date",
            SortMode::Priority => "priority",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(SortMode::Default),
            "due-date" | "due_date" | "duedate" | "due" => Ok(SortMode::DueDate),
            "priority" => Ok(SortMode::Priority),
            _ => Err(ParseError::new("sort mode", s, "default, due-date, priority")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ParseError::new("theme", s, "light, dark")),
        }
    }
}

/// Visual preferences; the only part of the view state that survives a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub reduce_animations: bool,
}

/// Current view settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub filter: StatusFilter,
    pub sort_mode: SortMode,
    pub search_query: String,
    pub preferences: Preferences,
}

impl ViewState {
    /// Fresh view state carrying previously saved preferences
    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }
}

fn by_due_date(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders an already-filtered list. Both orderings are stable, so ties keep
/// their incoming order.
pub fn apply_sort(mut tasks: Vec<Task>, mode: SortMode) -> Vec<Task> {
    match mode {
        SortMode::Default => {}
        SortMode::DueDate => tasks.sort_by(by_due_date),
        SortMode::Priority => tasks.sort_by_key(|t| t.priority.rank()),
    }
    tasks
}

/// The list a presentation layer renders: filter, search, then sort.
///
/// Recomputed on every call from the snapshots it is given.
pub fn visible_tasks(tasks: &[Task], view: &ViewState) -> Vec<Task> {
    apply_sort(
        filter_tasks(tasks, view.filter, &view.search_query),
        view.sort_mode,
    )
}
