//! Cloudant / CouchDB-backed [`todo_core::Repository`].
//!
//! Every document carries a revision token (`_rev`). Updates and deletes
//! must present the current revision, which this crate fetches right before
//! each write. The token never leaves the crate.

mod client;
mod config;
mod storage;

pub use client::{CouchClient, DocumentMeta};
pub use config::CloudantConfig;
pub use storage::CloudantRepository;
