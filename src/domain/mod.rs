//! Domain models for the to-do engine
//!
//! Contains the core business logic without any I/O concerns.

mod clock;
mod id;
mod list;
mod task;
mod view;

pub use clock::{Clock, SystemClock};
pub use id::{HashIdGenerator, IdError, IdGenerator, TaskId};
pub use list::{filter_tasks, CompletionStats, StatusFilter, TaskError, TaskList};
pub use task::{
    validate_text, DueDateChange, ParseError, Priority, Task, TaskUpdate, ValidationError,
    MAX_TEXT_LEN,
};
pub use view::{apply_sort, visible_tasks, Preferences, SortMode, Theme, ViewState};
