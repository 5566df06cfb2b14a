use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::Client;
use todo_core::{Repository, StorageError, TodoItem};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::codec::{self, Attributes};
use crate::config::DynamoConfig;

/// Key-value repository on a single DynamoDB table.
///
/// Identity is the table's hash key. Puts overwrite the row at the key
/// without reading it first, so concurrent writers resolve as last writer
/// wins. Deleting a missing key succeeds.
///
/// The client is created lazily by [`Repository::init`] and reused by every
/// later invocation.
pub struct DynamoRepository {
    config: DynamoConfig,
    client: OnceCell<Client>,
}

impl DynamoRepository {
    /// Create a repository that connects on first `init`.
    pub fn new(config: DynamoConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// Create a repository around an already configured client.
    pub fn with_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            config: DynamoConfig::new(table_name),
            client: OnceCell::from(client),
        }
    }

    fn client(&self) -> Result<&Client, StorageError> {
        self.client.get().ok_or_else(|| {
            StorageError::Connection("DynamoDB client is not initialized".to_string())
        })
    }

    async fn connect(&self) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &self.config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        info!(
            "Connected DynamoDB client for table {} (region: {:?})",
            self.config.table_name,
            sdk_config.region()
        );
        Client::new(&sdk_config)
    }
}

/// Map an SDK failure onto the storage taxonomy.
///
/// Transport failures are connection errors; a missing table means the
/// repository is misconfigured.
fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug,
{
    let connection_failure = matches!(
        err,
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)
    );
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);
    let message = format!("DynamoDB {} error: {}", operation, DisplayErrorContext(&err));

    match code.as_deref() {
        _ if connection_failure => StorageError::Connection(message),
        Some("ResourceNotFoundException") => StorageError::Connection(message),
        Some("ConditionalCheckFailedException") => StorageError::Conflict(message),
        _ => StorageError::Io(message),
    }
}

#[async_trait]
impl Repository for DynamoRepository {
    fn backend_name(&self) -> &'static str {
        "dynamodb"
    }

    async fn init(&self) -> Result<(), StorageError> {
        let _client = self.client.get_or_init(|| self.connect()).await;
        Ok(())
    }

    #[instrument(skip(self, item), level = "debug", fields(id = %item.id))]
    async fn put(&self, mut item: TodoItem) -> Result<TodoItem, StorageError> {
        let client = self.client()?;
        if !item.is_persisted() {
            item.id = Uuid::new_v4().to_string();
        }

        client
            .put_item()
            .table_name(&self.config.table_name)
            .set_item(Some(codec::to_attributes(&item)))
            .send()
            .await
            .map_err(|e| sdk_error("PutItem", e))?;

        debug!("Put item {} to DynamoDB", item.id);
        Ok(item)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get(&self, id: &str) -> Result<TodoItem, StorageError> {
        let output = self
            .client()?
            .get_item()
            .table_name(&self.config.table_name)
            .key(codec::ID, codec::key(id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| sdk_error("GetItem", e))?;

        match output.item {
            Some(attrs) if !attrs.is_empty() => codec::from_attributes(&attrs),
            _ => {
                debug!("DynamoDB item not found: {}", id);
                Err(StorageError::NotFound(format!("item {}", id)))
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<TodoItem>, StorageError> {
        let client = self.client()?;
        let mut items = Vec::new();
        let mut start_key: Option<Attributes> = None;

        loop {
            let output = client
                .scan()
                .table_name(&self.config.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| sdk_error("Scan", e))?;

            for row in output.items.unwrap_or_default() {
                items.push(codec::from_attributes(&row)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(
            "Scanned {} items from table {}",
            items.len(),
            self.config.table_name
        );
        Ok(items)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.client()?
            .delete_item()
            .table_name(&self.config.table_name)
            .key(codec::ID, codec::key(id))
            .send()
            .await
            .map_err(|e| sdk_error("DeleteItem", e))?;

        debug!("Deleted item {} from DynamoDB", id);
        Ok(())
    }
}
