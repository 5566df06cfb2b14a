//! Repository selection.

use std::sync::Arc;

use todo_core::{MemoryRepository, Repository, RepositoryOptions, StorageError};
use todo_storage_cloudant::{CloudantConfig, CloudantRepository};
use todo_storage_dynamodb::{DynamoConfig, DynamoRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    Dynamodb,
    Cloudant,
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Dynamodb => write!(f, "dynamodb"),
            Backend::Cloudant => write!(f, "cloudant"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

/// Build the repository for `backend` from a flat option map.
///
/// Only the options of the selected backend are read. No connection is
/// made here; that happens on the first `init`.
pub fn build_repository(
    backend: Backend,
    options: &RepositoryOptions,
) -> Result<Arc<dyn Repository>, StorageError> {
    let repo: Arc<dyn Repository> = match backend {
        Backend::Dynamodb => Arc::new(DynamoRepository::new(DynamoConfig::from_options(
            options,
        )?)),
        Backend::Cloudant => Arc::new(CloudantRepository::new(CloudantConfig::from_options(
            options,
        )?)),
        Backend::Memory => Arc::new(MemoryRepository::new()),
    };
    Ok(repo)
}
