//! todo-cli - A local to-do list engine
//!
//! Tasks live in an ordered, newest-first collection with completion state,
//! priority and optional due dates. A separate view state filters, searches
//! and sorts that collection. Both are persisted as JSON snapshots through a
//! small key-value storage trait.

pub mod cli;
pub mod domain;
pub mod storage;
pub mod store;

pub use domain::{Priority, Task, TaskId};
pub use store::{TaskStore, TodoApp, ViewStore};
