//! Persisted snapshot formats
//!
//! | Key | Contents |
//! |-----|----------|
//! | `todo-storage` | `{"schemaVersion": 1, "tasks": [Task, ...]}` |
//! | `ui-storage` | `{"theme": "light", "reduceAnimations": false}` |
//!
//! Task snapshots are checked field by field on load. Anything that does not
//! match the schema is rejected as a whole; callers fall back to empty state.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{validate_text, Preferences, Task, TaskId};

pub const TASKS_KEY: &str = "todo-storage";
pub const PREFERENCES_KEY: &str = "ui-storage";
pub const SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot is not a JSON object")]
    NotAnObject,

    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(Value),

    #[error("Snapshot has no task array")]
    MissingTasks,

    #[error("Task {index} is malformed: {reason}")]
    InvalidTask { index: usize, reason: String },

    #[error("Task ID appears more than once: {0}")]
    DuplicateId(TaskId),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskSnapshot<'a> {
    schema_version: u64,
    tasks: &'a [Task],
}

/// Serializes the full collection into the versioned envelope
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&TaskSnapshot {
        schema_version: SCHEMA_VERSION,
        tasks,
    })
}

/// Parses and validates a task snapshot
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, SchemaError> {
    let mut value: Value = serde_json::from_str(raw)?;
    let envelope = value.as_object_mut().ok_or(SchemaError::NotAnObject)?;

    match envelope.get("schemaVersion") {
        Some(v) if v.as_u64() == Some(SCHEMA_VERSION) => {}
        Some(v) => return Err(SchemaError::UnsupportedVersion(v.clone())),
        None => return Err(SchemaError::UnsupportedVersion(Value::Null)),
    }

    let items = match envelope.remove("tasks") {
        Some(Value::Array(items)) => items,
        _ => return Err(SchemaError::MissingTasks),
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let task: Task = serde_json::from_value(item).map_err(|e| SchemaError::InvalidTask {
            index,
            reason: e.to_string(),
        })?;
        check_task(index, &task)?;

        if !seen.insert(task.id.clone()) {
            return Err(SchemaError::DuplicateId(task.id));
        }
        tasks.push(task);
    }

    Ok(tasks)
}

fn check_task(index: usize, task: &Task) -> Result<(), SchemaError> {
    let invalid = |reason: String| SchemaError::InvalidTask { index, reason };

    match validate_text(&task.text) {
        Ok(trimmed) if trimmed == task.text => {}
        Ok(_) => return Err(invalid("text has surrounding whitespace".to_string())),
        Err(e) => return Err(invalid(e.to_string())),
    }

    if task.updated_at < task.created_at {
        return Err(invalid("updatedAt precedes createdAt".to_string()));
    }

    Ok(())
}

pub fn encode_preferences(preferences: &Preferences) -> Result<String, serde_json::Error> {
    serde_json::to_string(preferences)
}

pub fn decode_preferences(raw: &str) -> Result<Preferences, SchemaError> {
    Ok(serde_json::from_str(raw)?)
}
