use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// `done_timestamp` value of an item that has not been completed.
pub const NOT_DONE: i64 = -1;

/// A single task.
///
/// Serialized as a flat object with the field names `ID`, `title`,
/// `description`, `insertion_timestamp`, `done_timestamp` and `done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Backend-assigned identity; empty until the first successful put.
    #[serde(rename = "ID", default)]
    pub id: String,
    pub title: String,
    pub description: String,
    /// Unix seconds, set once at creation
    pub insertion_timestamp: i64,
    /// Unix seconds, or [`NOT_DONE`]
    pub done_timestamp: i64,
    pub done: bool,
}

impl TodoItem {
    /// Create an unsaved, not-done item inserted at `now`.
    pub fn new(title: impl Into<String>, description: impl Into<String>, now: i64) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: description.into(),
            insertion_timestamp: now,
            done_timestamp: NOT_DONE,
            done: false,
        }
    }

    /// Whether the item has been assigned an identity by a backend.
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Mark the item as completed at `now`. Sets both completion fields.
    pub fn mark_done(&mut self, now: i64) {
        self.done = true;
        self.done_timestamp = now;
    }
}

/// Payload of the put operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PutRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl PutRequest {
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.title.is_empty() {
            return Err(StorageError::Validation("title is required".to_string()));
        }
        if self.description.is_empty() {
            return Err(StorageError::Validation(
                "description is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Payload of the get, done and delete operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdRequest {
    #[serde(default)]
    pub id: String,
}

impl IdRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        if self.id.is_empty() {
            return Err(StorageError::Validation("ID has to be supplied".to_string()));
        }
        Ok(())
    }
}
