use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use todo_core::{Repository, StorageError, TodoItem, NOT_DONE};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::client::CouchClient;
use crate::config::CloudantConfig;

/// Stored shape of an item: the entity fields plus CouchDB's `_id`/`_rev`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    rev: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    insertion_timestamp: i64,
    #[serde(default = "not_done")]
    done_timestamp: i64,
    #[serde(default)]
    done: bool,
}

fn not_done() -> i64 {
    NOT_DONE
}

impl TodoDocument {
    fn from_item(item: &TodoItem, rev: Option<String>) -> Self {
        Self {
            id: item.id.clone(),
            rev,
            title: item.title.clone(),
            description: item.description.clone(),
            insertion_timestamp: item.insertion_timestamp,
            done_timestamp: item.done_timestamp,
            done: item.done,
        }
    }

    fn into_item(self) -> TodoItem {
        TodoItem {
            id: self.id,
            title: self.title,
            description: self.description,
            insertion_timestamp: self.insertion_timestamp,
            done_timestamp: self.done_timestamp,
            done: self.done,
        }
    }
}

/// Document repository on a Cloudant or CouchDB database.
///
/// Writes to an existing document first read its current revision and send
/// it along with the new body. A revision that went stale in between is
/// rejected by the server and surfaces as [`StorageError::Conflict`]; there
/// is no retry.
///
/// `list` reads `_all_docs` and then fetches every document individually.
pub struct CloudantRepository {
    config: CloudantConfig,
    client: OnceCell<CouchClient>,
}

impl CloudantRepository {
    pub fn new(config: CloudantConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&CouchClient, StorageError> {
        self.client.get().ok_or_else(|| {
            StorageError::Connection("CouchDB client is not initialized".to_string())
        })
    }

    async fn connect(&self) -> Result<CouchClient, StorageError> {
        let client = CouchClient::new(&self.config);
        let db = &self.config.db_name;

        if client.database_exists(db).await? {
            debug!("CouchDB database {} exists", db);
        } else {
            info!("CouchDB database {} does not exist, creating it", db);
            client.create_database(db).await?;
        }

        info!("Connected to CouchDB at {} (db: {})", self.config.base_url(), db);
        Ok(client)
    }

    /// Current revision of a stored document.
    async fn current_revision(&self, id: &str) -> Result<String, StorageError> {
        let doc = self
            .client()?
            .get_document::<TodoDocument>(&self.config.db_name, id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("item {}", id)))?;

        doc.rev
            .filter(|rev| !rev.is_empty())
            .ok_or_else(|| StorageError::Internal(format!("document {} has no revision", id)))
    }
}

#[async_trait]
impl Repository for CloudantRepository {
    fn backend_name(&self) -> &'static str {
        "cloudant"
    }

    async fn init(&self) -> Result<(), StorageError> {
        self.client.get_or_try_init(|| self.connect()).await?;
        Ok(())
    }

    #[instrument(skip(self, item), level = "debug", fields(id = %item.id))]
    async fn put(&self, mut item: TodoItem) -> Result<TodoItem, StorageError> {
        let client = self.client()?;
        let db = &self.config.db_name;

        let meta = if !item.is_persisted() {
            let doc = TodoDocument::from_item(&item, None);
            client.insert_document(db, &doc).await?
        } else {
            let rev = self.current_revision(&item.id).await?;
            let doc = TodoDocument::from_item(&item, Some(rev));
            client.update_document(db, &item.id, &doc).await?
        };

        debug!("Stored item {} at revision {}", meta.id, meta.rev);
        item.id = meta.id;
        Ok(item)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get(&self, id: &str) -> Result<TodoItem, StorageError> {
        let doc = self
            .client()?
            .get_document::<TodoDocument>(&self.config.db_name, id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("item {}", id)))?;

        if doc.id.is_empty() {
            return Err(StorageError::Internal(format!(
                "document fetched for {} has an empty id",
                id
            )));
        }
        Ok(doc.into_item())
    }

    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<TodoItem>, StorageError> {
        let ids = self.client()?.all_doc_ids(&self.config.db_name).await?;

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            items.push(self.get(&id).await?);
        }

        debug!("Listed {} items from {}", items.len(), self.config.db_name);
        Ok(items)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let rev = self.current_revision(id).await?;
        self.client()?
            .delete_document(&self.config.db_name, id, &rev)
            .await?;

        debug!("Deleted item {} at revision {}", id, rev);
        Ok(())
    }
}
