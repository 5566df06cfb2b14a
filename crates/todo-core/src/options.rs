use std::collections::HashMap;

use crate::error::StorageError;

/// Flat backend configuration: option name to value.
pub type RepositoryOptions = HashMap<String, String>;

/// Look up a required, non-empty option.
pub fn require_option(options: &RepositoryOptions, name: &str) -> Result<String, StorageError> {
    optional_option(options, name)
        .ok_or_else(|| StorageError::Validation(format!("missing repository option '{}'", name)))
}

/// Look up an option, treating empty values as absent.
pub fn optional_option(options: &RepositoryOptions, name: &str) -> Option<String> {
    options
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
