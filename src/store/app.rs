//! Composition root
//!
//! Owns one [`TaskStore`] and one [`ViewStore`] sharing the same storage.
//! Presentation code builds a `TodoApp` once and passes it where needed.

use super::{Notice, TaskStore, ViewStore};
use crate::domain::{visible_tasks, Task};
use crate::storage::KeyValueStore;

pub struct TodoApp {
    pub tasks: TaskStore,
    pub view: ViewStore,
}

impl TodoApp {
    /// Opens both stores on `storage`, restoring whatever was saved
    pub fn open<S>(storage: S) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        Self {
            tasks: TaskStore::open(storage.clone()),
            view: ViewStore::open(storage),
        }
    }

    /// The list to render: current filter and search, then the sort mode
    pub fn visible_tasks(&self) -> Vec<Task> {
        visible_tasks(self.tasks.tasks(), self.view.state())
    }

    /// Drains notices from both stores
    pub fn take_notices(&mut self) -> Vec<Notice> {
        let mut notices = self.tasks.take_notices();
        notices.extend(self.view.take_notices());
        notices
    }
}
