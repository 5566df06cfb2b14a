//! DynamoDB-backed [`todo_core::Repository`].
//!
//! Items live in a single table whose hash key is the string attribute `ID`.

mod codec;
mod config;
mod storage;

pub use config::DynamoConfig;
pub use storage::DynamoRepository;
