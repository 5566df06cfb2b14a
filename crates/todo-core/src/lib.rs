//! Core traits and types for the ToDo service.
//!
//! This crate defines the pieces shared by every storage backend:
//! - `TodoItem`: the stored entity and its request payloads
//! - `Repository`: the storage contract each backend implements
//! - `usecase`: the `put`, `get`, `list`, `done` and `delete` operations
//! - `MemoryRepository`: an in-process backend for local runs and tests

mod error;
mod memory;
mod model;
mod options;
mod repository;
pub mod usecase;

pub use error::StorageError;
pub use memory::MemoryRepository;
pub use model::{IdRequest, PutRequest, TodoItem, NOT_DONE};
pub use options::{optional_option, require_option, RepositoryOptions};
pub use repository::Repository;
