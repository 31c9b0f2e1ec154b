//! Task store
//!
//! Wraps a [`TaskList`] with snapshot persistence. Every mutation is two
//! steps: the in-memory command on the list, then a full snapshot write.

use chrono::NaiveDate;

use super::{Listeners, Notice, NoticeKind, PersistError, SubscriptionId};
use crate::domain::{
    Clock, CompletionStats, HashIdGenerator, IdGenerator, Priority, StatusFilter, SystemClock,
    Task, TaskError, TaskId, TaskList, TaskUpdate,
};
use crate::storage::{decode_tasks, encode_tasks, KeyValueStore, TASKS_KEY};

// Attempts at finding an unused ID before giving up
const MAX_ID_ATTEMPTS: usize = 16;

/// Change notification sent to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Added(TaskId),
    Toggled { id: TaskId, completed: bool },
    Updated(TaskId),
    Deleted(TaskId),
    ClearedCompleted { removed: usize },
    PersistFailed(String),
}

pub struct TaskStore {
    list: TaskList,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    listeners: Listeners<TaskEvent>,
    notices: Vec<Notice>,
}

impl TaskStore {
    /// Opens a store on `storage` with the system clock and hash IDs
    pub fn open(storage: impl KeyValueStore + 'static) -> Self {
        Self::with_parts(
            Box::new(storage),
            Box::new(SystemClock),
            Box::new(HashIdGenerator::new()),
        )
    }

    /// Opens a store with explicit collaborators, restoring saved tasks.
    ///
    /// Unreadable or invalid snapshots leave the store empty and queue a notice.
    pub fn with_parts(
        storage: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let mut notices = Vec::new();
        let list = match Self::load(storage.as_ref()) {
            Ok(list) => list,
            Err(message) => {
                tracing::warn!(%message, "starting with an empty task list");
                notices.push(Notice::new(NoticeKind::LoadFallback, message));
                TaskList::new()
            }
        };

        tracing::debug!(count = list.len(), "task store opened");

        Self {
            list,
            storage,
            clock,
            ids,
            listeners: Listeners::default(),
            notices,
        }
    }

    fn load(storage: &dyn KeyValueStore) -> Result<TaskList, String> {
        let raw = storage
            .get(TASKS_KEY)
            .map_err(|e| format!("Could not read saved tasks: {}", e))?;

        match raw {
            None => Ok(TaskList::new()),
            Some(raw) => decode_tasks(&raw)
                .map(TaskList::from_tasks)
                .map_err(|e| format!("Saved tasks were discarded: {}", e)),
        }
    }

    /// Writes the full collection under the tasks key
    pub fn save(&self) -> Result<(), PersistError> {
        let snapshot = encode_tasks(self.list.tasks())?;
        self.storage.set(TASKS_KEY, &snapshot)?;
        Ok(())
    }

    // Persists, turning a failure into a notice, then tells subscribers
    fn commit(&mut self, event: TaskEvent) {
        if let Err(e) = self.save() {
            let message = format!("Changes could not be saved: {}", e);
            tracing::warn!(error = %e, "task snapshot write failed");
            self.notices
                .push(Notice::new(NoticeKind::PersistFailed, message.clone()));
            self.listeners.emit(&TaskEvent::PersistFailed(message));
        }
        self.listeners.emit(&event);
    }

    /// Validates `text` and prepends a new task
    pub fn add_task(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
    ) -> Result<TaskId, TaskError> {
        let now = self.clock.now();

        let mut id = self.ids.next_id(text, now);
        for _ in 1..MAX_ID_ATTEMPTS {
            if !self.list.contains(&id) {
                break;
            }
            id = self.ids.next_id(text, now);
        }

        let id = self.list.add(id, text, priority, due_date, now)?.id.clone();
        tracing::debug!(%id, %priority, "task added");

        self.commit(TaskEvent::Added(id.clone()));
        Ok(id)
    }

    pub fn toggle_task(&mut self, id: &TaskId) -> Result<(), TaskError> {
        let now = self.clock.now();
        let completed = self.list.toggle(id, now)?.completed;
        tracing::debug!(%id, completed, "task toggled");

        self.commit(TaskEvent::Toggled {
            id: id.clone(),
            completed,
        });
        Ok(())
    }

    /// Re-validates the text and applies the edit
    pub fn update_task(&mut self, id: &TaskId, update: TaskUpdate) -> Result<(), TaskError> {
        let now = self.clock.now();
        self.list.update(id, &update, now)?;
        tracing::debug!(%id, "task updated");

        self.commit(TaskEvent::Updated(id.clone()));
        Ok(())
    }

    pub fn set_priority(&mut self, id: &TaskId, priority: Priority) -> Result<(), TaskError> {
        let now = self.clock.now();
        self.list.set_priority(id, priority, now)?;
        tracing::debug!(%id, %priority, "task priority changed");

        self.commit(TaskEvent::Updated(id.clone()));
        Ok(())
    }

    pub fn delete_task(&mut self, id: &TaskId) -> Result<(), TaskError> {
        self.list.delete(id)?;
        tracing::debug!(%id, "task deleted");

        self.commit(TaskEvent::Deleted(id.clone()));
        Ok(())
    }

    /// Removes every completed task. Nothing is written when nothing was removed.
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.list.clear_completed();
        if removed > 0 {
            tracing::debug!(removed, "completed tasks cleared");
            self.commit(TaskEvent::ClearedCompleted { removed });
        }
        removed
    }

    /// Status filter plus case-insensitive search; never touches stored state
    pub fn filtered_tasks(&self, filter: StatusFilter, search_query: &str) -> Vec<Task> {
        self.list.filtered(filter, search_query)
    }

    /// The full collection, newest first
    pub fn tasks(&self) -> &[Task] {
        self.list.tasks()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.list.get(id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn stats(&self) -> CompletionStats {
        self.list.stats()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TaskEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Drains queued warnings
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
