use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::TodoItem;
use crate::repository::Repository;

/// In-process repository backed by a `HashMap`.
///
/// Follows the key-value semantics: puts are upserts and deleting a missing
/// key is a no-op. State lives as long as the value.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: RwLock<HashMap<String, TodoItem>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    #[instrument(skip(self, item), level = "debug", fields(id = %item.id))]
    async fn put(&self, mut item: TodoItem) -> Result<TodoItem, StorageError> {
        if !item.is_persisted() {
            item.id = Uuid::new_v4().to_string();
        }
        self.items
            .write()
            .await
            .insert(item.id.clone(), item.clone());
        debug!("Stored item {} in memory", item.id);
        Ok(item)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get(&self, id: &str) -> Result<TodoItem, StorageError> {
        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("item {}", id)))
    }

    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<TodoItem>, StorageError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let existed = self.items.write().await.remove(id).is_some();
        debug!("Deleted item {} (existed: {})", id, existed);
        Ok(())
    }
}
