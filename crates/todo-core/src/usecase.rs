//! ToDo use cases.
//!
//! Each operation initializes the repository, performs its calls in
//! sequence and returns repository errors unchanged. Request validation
//! happens at the boundary, before these functions are called.

use tracing::{debug, instrument};

use crate::error::StorageError;
use crate::model::{IdRequest, PutRequest, TodoItem};
use crate::repository::Repository;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Create a new, not-done item.
#[instrument(skip(repo, req), fields(backend = repo.backend_name()))]
pub async fn put(repo: &dyn Repository, req: PutRequest) -> Result<TodoItem, StorageError> {
    repo.init().await?;

    let item = TodoItem::new(req.title, req.description, now());
    let stored = repo.put(item).await?;
    debug!("Created item {}", stored.id);
    Ok(stored)
}

#[instrument(skip(repo), fields(backend = repo.backend_name()))]
pub async fn get(repo: &dyn Repository, req: IdRequest) -> Result<TodoItem, StorageError> {
    repo.init().await?;
    repo.get(&req.id).await
}

#[instrument(skip(repo), fields(backend = repo.backend_name()))]
pub async fn list(repo: &dyn Repository) -> Result<Vec<TodoItem>, StorageError> {
    repo.init().await?;
    repo.list().await
}

/// Mark an existing item as completed and store it.
#[instrument(skip(repo), fields(backend = repo.backend_name()))]
pub async fn done(repo: &dyn Repository, req: IdRequest) -> Result<TodoItem, StorageError> {
    repo.init().await?;

    let mut item = repo.get(&req.id).await?;
    item.mark_done(now());
    let stored = repo.put(item).await?;
    debug!("Marked item {} as done", stored.id);
    Ok(stored)
}

/// Delete an existing item.
///
/// The item is fetched first so that a missing id is reported as
/// [`StorageError::NotFound`] regardless of how the backend treats deletes
/// of absent keys.
#[instrument(skip(repo), fields(backend = repo.backend_name()))]
pub async fn delete(repo: &dyn Repository, req: IdRequest) -> Result<(), StorageError> {
    repo.init().await?;

    repo.get(&req.id).await?;
    repo.delete(&req.id).await?;
    debug!("Deleted item {}", req.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::memory::MemoryRepository;
    use crate::model::NOT_DONE;

    /// Repository whose connection can never be established.
    #[derive(Default)]
    struct UnreachableRepository {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Repository for UnreachableRepository {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }

        async fn init(&self) -> Result<(), StorageError> {
            Err(StorageError::Connection("store is down".to_string()))
        }

        async fn put(&self, item: TodoItem) -> Result<TodoItem, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(item)
        }

        async fn get(&self, id: &str) -> Result<TodoItem, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::NotFound(id.to_string()))
        }

        async fn list(&self) -> Result<Vec<TodoItem>, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn delete(&self, _id: &str) -> Result<(), StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn put_request(title: &str, description: &str) -> PutRequest {
        PutRequest {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_creates_not_done_item() {
        let repo = MemoryRepository::new();
        let before = now();

        let item = put(&repo, put_request("Buy milk", "2%")).await.unwrap();

        assert!(!item.id.is_empty());
        assert_eq!(item.title, "Buy milk");
        assert_eq!(item.description, "2%");
        assert!(!item.done);
        assert_eq!(item.done_timestamp, NOT_DONE);
        assert!(item.insertion_timestamp >= before);
    }

    #[tokio::test]
    async fn test_get_returns_stored_item() {
        let repo = MemoryRepository::new();
        let item = put(&repo, put_request("t", "d")).await.unwrap();

        let fetched = get(&repo, IdRequest::new(&item.id)).await.unwrap();
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn test_done_is_visible_to_later_reads() {
        let repo = MemoryRepository::new();
        let item = put(&repo, put_request("t", "d")).await.unwrap();

        let finished = done(&repo, IdRequest::new(&item.id)).await.unwrap();
        assert_eq!(finished.id, item.id);
        assert!(finished.done);
        assert_ne!(finished.done_timestamp, NOT_DONE);
        assert_eq!(finished.insertion_timestamp, item.insertion_timestamp);

        let fetched = get(&repo, IdRequest::new(&item.id)).await.unwrap();
        assert_eq!(fetched, finished);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let repo = MemoryRepository::new();

        let err = get(&repo, IdRequest::new("missing")).await.unwrap_err();
        assert!(err.is_not_found());

        let err = done(&repo, IdRequest::new("missing")).await.unwrap_err();
        assert!(err.is_not_found());

        // The memory backend deletes missing keys silently; the use case must not.
        let err = delete(&repo, IdRequest::new("missing")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let repo = MemoryRepository::new();
        assert!(list(&repo).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_init_failure_is_propagated_unchanged() {
        let repo = UnreachableRepository::default();

        assert!(matches!(
            put(&repo, put_request("t", "d")).await,
            Err(StorageError::Connection(_))
        ));
        assert!(matches!(
            get(&repo, IdRequest::new("x")).await,
            Err(StorageError::Connection(_))
        ));
        assert!(matches!(list(&repo).await, Err(StorageError::Connection(_))));
        assert!(matches!(
            done(&repo, IdRequest::new("x")).await,
            Err(StorageError::Connection(_))
        ));
        assert!(matches!(
            delete(&repo, IdRequest::new("x")).await,
            Err(StorageError::Connection(_))
        ));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let repo = MemoryRepository::new();

        let item = put(&repo, put_request("Buy milk", "2%")).await.unwrap();
        assert_eq!(item.done_timestamp, NOT_DONE);

        let finished = done(&repo, IdRequest::new(&item.id)).await.unwrap();
        assert!(finished.done);

        let items = list(&repo).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, item.id);
        assert!(items[0].done);

        delete(&repo, IdRequest::new(&item.id)).await.unwrap();

        let err = get(&repo, IdRequest::new(&item.id)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
