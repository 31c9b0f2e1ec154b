//! Task identifiers
//!
//! ID Format: `t-{10-char-hash}` (e.g., `t-9d3e5f2a41`)
//!
//! Hash is derived from text + creation timestamp + a per-generator sequence,
//! so the same text added twice in the same instant still gets distinct IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "t-";
const HASH_LEN: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{10-char-hash}}', got '{0}'")]
    InvalidTaskId(String),
}

/// Generates a 10-character hash from text, timestamp and sequence
fn generate_hash(text: &str, timestamp: DateTime<Utc>, sequence: u64) -> String {
    let input = format!(
        "{}{}{}",
        text,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        sequence
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..HASH_LEN].to_string()
}

/// Opaque task ID in the format `t-{10-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    hash: String,
}

impl TaskId {
    /// Creates a task ID from text, timestamp and a disambiguating sequence
    pub fn new(text: &str, timestamp: DateTime<Utc>, sequence: u64) -> Self {
        Self {
            hash: generate_hash(text, timestamp, sequence),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.hash)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        if hash.len() != HASH_LEN || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

/// Source of fresh task IDs
pub trait IdGenerator {
    /// Returns an ID for a task with the given text created at `now`
    fn next_id(&mut self, text: &str, now: DateTime<Utc>) -> TaskId;
}

/// Default generator: blake3 over text, timestamp and a running sequence
#[derive(Debug, Default)]
pub struct HashIdGenerator {
    sequence: u64,
}

impl HashIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for HashIdGenerator {
    fn next_id(&mut self, text: &str, now: DateTime<Utc>) -> TaskId {
        self.sequence = self.sequence.wrapping_add(1);
        TaskId::new(text, now, self.sequence)
    }
}
