use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use todo_core::StorageError;
use tracing::{debug, instrument};

use crate::config::CloudantConfig;

/// Identity and revision of a written document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentMeta {
    pub id: String,
    pub rev: String,
}

/// Error body CouchDB sends with unsuccessful responses.
#[derive(Deserialize)]
struct CouchErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

#[derive(Deserialize)]
struct AllDocs {
    #[serde(default)]
    rows: Vec<AllDocsRow>,
}

#[derive(Deserialize)]
struct AllDocsRow {
    id: String,
}

/// CouchDB REST API client.
///
/// Speaks the subset of the CouchDB HTTP API that Cloudant also serves:
/// database existence/creation, single document CRUD and `_all_docs`.
/// Requests authenticate with HTTP basic auth.
pub struct CouchClient {
    http_client: HttpClient,
    base_url: String,
    username: String,
    password: String,
}

impl CouchClient {
    /// Create a new client.
    pub fn new(config: &CloudantConfig) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn db_url(&self, db: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(db))
    }

    fn doc_url(&self, db: &str, id: &str) -> String {
        format!("{}/{}", self.db_url(db), urlencoding::encode(id))
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, StorageError> {
        request
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                let message = format!("CouchDB {} request failed: {}", operation, e);
                if e.is_connect() || e.is_timeout() {
                    StorageError::Connection(message)
                } else {
                    StorageError::Io(message)
                }
            })
    }

    /// Check whether a database exists.
    #[instrument(skip(self), level = "debug")]
    pub async fn database_exists(&self, db: &str) -> Result<bool, StorageError> {
        let response = self
            .send(self.http_client.head(self.db_url(db)), "HEAD database")
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error("HEAD database", response).await),
        }
    }

    /// Create a database. Succeeds if another writer created it first.
    #[instrument(skip(self), level = "debug")]
    pub async fn create_database(&self, db: &str) -> Result<(), StorageError> {
        let response = self
            .send(self.http_client.put(self.db_url(db)), "PUT database")
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::PRECONDITION_FAILED {
            debug!("CouchDB database {} ready (status {})", db, status);
            return Ok(());
        }
        Err(status_error("PUT database", response).await)
    }

    /// Fetch the latest revision of a document.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_document<T: DeserializeOwned>(
        &self,
        db: &str,
        id: &str,
    ) -> Result<Option<T>, StorageError> {
        let request = self
            .http_client
            .get(self.doc_url(db, id))
            .query(&[("latest", "true")]);
        let response = self.send(request, "GET document").await?;

        if response.status() == StatusCode::NOT_FOUND {
            let text = response.text().await.unwrap_or_default();
            if is_missing_database(&text) {
                return Err(StorageError::Connection(format!(
                    "CouchDB database {} does not exist: {}",
                    db, text
                )));
            }
            debug!("CouchDB document not found: {}", id);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error("GET document", response).await);
        }

        let doc = response
            .json::<T>()
            .await
            .map_err(|e| StorageError::Serialization(format!("Failed to parse document {}: {}", id, e)))?;
        Ok(Some(doc))
    }

    /// Create a document and let the server assign its id and first revision.
    #[instrument(skip(self, doc), level = "debug")]
    pub async fn insert_document<T: Serialize>(
        &self,
        db: &str,
        doc: &T,
    ) -> Result<DocumentMeta, StorageError> {
        let request = self.http_client.post(self.db_url(db)).json(doc);
        let response = self.send(request, "POST document").await?;
        write_result("POST document", response).await
    }

    /// Write a document at a known id. The body must carry the current `_rev`
    /// when the document already exists.
    #[instrument(skip(self, doc), level = "debug")]
    pub async fn update_document<T: Serialize>(
        &self,
        db: &str,
        id: &str,
        doc: &T,
    ) -> Result<DocumentMeta, StorageError> {
        let request = self.http_client.put(self.doc_url(db, id)).json(doc);
        let response = self.send(request, "PUT document").await?;
        write_result("PUT document", response).await
    }

    /// Delete the given revision of a document.
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_document(&self, db: &str, id: &str, rev: &str) -> Result<(), StorageError> {
        let request = self
            .http_client
            .delete(self.doc_url(db, id))
            .query(&[("rev", rev)]);
        let response = self.send(request, "DELETE document").await?;

        if !response.status().is_success() {
            return Err(status_error("DELETE document", response).await);
        }
        debug!("CouchDB DELETE {} (rev {})", id, rev);
        Ok(())
    }

    /// List the ids of every document in a database, design documents excluded.
    #[instrument(skip(self), level = "debug")]
    pub async fn all_doc_ids(&self, db: &str) -> Result<Vec<String>, StorageError> {
        let url = format!("{}/_all_docs", self.db_url(db));
        let response = self.send(self.http_client.get(url), "GET _all_docs").await?;

        if !response.status().is_success() {
            return Err(status_error("GET _all_docs", response).await);
        }

        let all_docs = response
            .json::<AllDocs>()
            .await
            .map_err(|e| StorageError::Serialization(format!("Failed to parse _all_docs: {}", e)))?;

        let ids: Vec<String> = all_docs
            .rows
            .into_iter()
            .map(|row| row.id)
            .filter(|id| !id.starts_with("_design/"))
            .collect();
        debug!("CouchDB _all_docs returned {} ids", ids.len());
        Ok(ids)
    }
}

async fn write_result(operation: &str, response: Response) -> Result<DocumentMeta, StorageError> {
    if !response.status().is_success() {
        return Err(status_error(operation, response).await);
    }
    let meta = response
        .json::<DocumentMeta>()
        .await
        .map_err(|e| StorageError::Serialization(format!("Failed to parse {} response: {}", operation, e)))?;
    debug!("CouchDB {} -> id {} rev {}", operation, meta.id, meta.rev);
    Ok(meta)
}

/// Map an unsuccessful response onto the storage taxonomy.
async fn status_error(operation: &str, response: Response) -> StorageError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = format!("CouchDB {} failed with status {}: {}", operation, status, text);

    match status {
        StatusCode::NOT_FOUND if is_missing_database(&text) => StorageError::Connection(message),
        StatusCode::NOT_FOUND => StorageError::NotFound(message),
        StatusCode::CONFLICT => StorageError::Conflict(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Connection(message),
        _ => StorageError::Io(message),
    }
}

/// A 404 body naming the database rather than a document.
fn is_missing_database(body: &str) -> bool {
    match serde_json::from_str::<CouchErrorBody>(body) {
        Ok(err) => {
            err.reason == "Database does not exist."
                || err.reason == "no_db_file"
                || err.error == "no_db_file"
        }
        Err(_) => false,
    }
}
