//! # Stores
//!
//! Explicitly constructed state containers that own the in-memory state,
//! persist it through a [`KeyValueStore`](crate::storage::KeyValueStore),
//! and notify subscribers after every change.
//!
//! - [`TaskStore`] - The task collection
//! - [`ViewStore`] - Filter, sort, search and visual preferences
//! - [`TodoApp`] - Composition root owning one of each
//!
//! Persistence faults never fail a mutation. They are logged, queued as
//! [`Notice`]s for the presentation layer, and emitted to subscribers.

mod app;
mod task_store;
mod view_store;

pub use app::TodoApp;
pub use task_store::{TaskEvent, TaskStore};
pub use view_store::{ViewEvent, ViewStore};

use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// Failure to write a snapshot
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What a notice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Saved state could not be read and defaults were used instead
    LoadFallback,
    /// A snapshot could not be written; in-memory state stands
    PersistFailed,
}

/// A non-fatal warning for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub(crate) fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Registered change listeners for one store
pub(crate) struct Listeners<E> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<E> Listeners<E> {
    pub(crate) fn subscribe(&mut self, listener: Listener<E>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &E) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }
}
