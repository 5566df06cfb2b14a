use async_trait::async_trait;

use crate::error::StorageError;
use crate::model::TodoItem;

/// Storage contract for ToDo items.
///
/// Backends are selected at construction time and used through
/// `Arc<dyn Repository>`. Every use-case invocation calls [`Repository::init`]
/// before any other method.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Returns the backend identifier (e.g., "dynamodb", "cloudant").
    fn backend_name(&self) -> &'static str;

    /// Establish the connection to the store.
    ///
    /// Must be safe to call once per invocation; connection handles may be
    /// cached across calls. A failure is fatal for the invocation.
    async fn init(&self) -> Result<(), StorageError>;

    /// Store an item.
    ///
    /// An empty `id` creates a new record with a backend-assigned identity.
    /// A non-empty `id` updates the record at that identity. The returned
    /// item equals the input except for `id`.
    async fn put(&self, item: TodoItem) -> Result<TodoItem, StorageError>;

    /// Fetch the item with the given identity.
    ///
    /// Fails with [`StorageError::NotFound`] if no such item exists.
    async fn get(&self, id: &str) -> Result<TodoItem, StorageError>;

    /// Return every stored item, in no particular order.
    ///
    /// An empty store yields an empty vector, not an error.
    async fn list(&self) -> Result<Vec<TodoItem>, StorageError>;

    /// Remove the item with the given identity.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}
