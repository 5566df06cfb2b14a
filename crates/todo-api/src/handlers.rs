//! HTTP handlers for the ToDo service.
//!
//! Implements:
//! - POST /put - Create an item from a JSON `{title, description}` body
//! - GET /get?id= - Fetch one item
//! - GET /lst - List all items
//! - POST /done?id= - Mark an item as done
//! - POST /del?id= - Delete an item
//! - GET /health - Health check endpoint

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use todo_core::{usecase, IdRequest, PutRequest, Repository, StorageError, TodoItem};
use tracing::{info, warn};

use crate::error::{ApiError, Result};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub request_timeout: Duration,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub backend: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/put", post(put_handler))
        .route("/get", get(get_handler))
        .route("/lst", get(list_handler))
        .route("/done", post(done_handler))
        .route("/del", post(delete_handler))
        .with_state(state)
}

/// Run a use case under the request deadline.
///
/// Expiry drops the use-case future, which aborts any outstanding backend
/// call.
async fn run<T, F>(state: &AppState, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, StorageError>>,
{
    let result = match tokio::time::timeout(state.request_timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(format!(
            "{} exceeded {:?}",
            operation, state.request_timeout
        ))),
    };

    if let Err(ref e) = result {
        warn!("{} failed: {}", operation, e);
    }
    result.map_err(ApiError::from)
}

/// GET /health - Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        backend: state.repo.backend_name(),
    })
}

/// POST /put - Create an item.
pub async fn put_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<TodoItem>> {
    let req: PutRequest = serde_json::from_slice(&body)?;
    req.validate()?;

    let item = run(&state, "put", usecase::put(state.repo.as_ref(), req)).await?;
    info!("Created item {}", item.id);
    Ok(Json(item))
}

/// GET /get?id= - Fetch one item.
pub async fn get_handler(
    State(state): State<AppState>,
    Query(req): Query<IdRequest>,
) -> Result<Json<TodoItem>> {
    req.validate()?;
    let item = run(&state, "get", usecase::get(state.repo.as_ref(), req)).await?;
    Ok(Json(item))
}

/// GET /lst - List every item. Always a JSON array.
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>> {
    let items = run(&state, "list", usecase::list(state.repo.as_ref())).await?;
    Ok(Json(items))
}

/// POST /done?id= - Mark an item as done.
pub async fn done_handler(
    State(state): State<AppState>,
    Query(req): Query<IdRequest>,
) -> Result<Json<TodoItem>> {
    req.validate()?;
    let item = run(&state, "done", usecase::done(state.repo.as_ref(), req)).await?;
    info!("Marked item {} as done", item.id);
    Ok(Json(item))
}

/// POST /del?id= - Delete an item.
pub async fn delete_handler(
    State(state): State<AppState>,
    Query(req): Query<IdRequest>,
) -> Result<Json<Value>> {
    req.validate()?;
    let id = req.id.clone();
    run(&state, "delete", usecase::delete(state.repo.as_ref(), req)).await?;
    info!("Deleted item {}", id);
    Ok(Json(json!({})))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use todo_core::MemoryRepository;
    use tokio::net::TcpListener;

    use super::*;

    async fn spawn(repo: Arc<dyn Repository>, request_timeout: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(AppState {
            repo,
            request_timeout,
        });
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_memory() -> String {
        spawn(Arc::new(MemoryRepository::new()), Duration::from_secs(5)).await
    }

    /// Repository whose connection never completes.
    struct HangingRepository;

    #[async_trait]
    impl Repository for HangingRepository {
        fn backend_name(&self) -> &'static str {
            "hanging"
        }

        async fn init(&self) -> std::result::Result<(), StorageError> {
            std::future::pending().await
        }

        async fn put(&self, item: TodoItem) -> std::result::Result<TodoItem, StorageError> {
            Ok(item)
        }

        async fn get(&self, id: &str) -> std::result::Result<TodoItem, StorageError> {
            Err(StorageError::NotFound(id.to_string()))
        }

        async fn list(&self) -> std::result::Result<Vec<TodoItem>, StorageError> {
            Ok(vec![])
        }

        async fn delete(&self, _id: &str) -> std::result::Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_item_lifecycle() {
        let base = spawn_memory().await;
        let http = reqwest::Client::new();

        let created: Value = http
            .post(format!("{}/put", base))
            .json(&json!({"title": "Buy milk", "description": "2%"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = created["ID"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(created["done"], false);
        assert_eq!(created["done_timestamp"], -1);

        let fetched: Value = http
            .get(format!("{}/get", base))
            .query(&[("id", &id)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(fetched, created);

        let finished: Value = http
            .post(format!("{}/done", base))
            .query(&[("id", &id)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(finished["done"], true);
        assert_ne!(finished["done_timestamp"], -1);

        let items: Vec<Value> = http
            .get(format!("{}/lst", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["ID"], json!(id));
        assert_eq!(items[0]["done"], true);

        let response = http
            .post(format!("{}/del", base))
            .query(&[("id", &id)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.json::<Value>().await.unwrap(), json!({}));

        let response = http
            .get(format!("{}/get", base))
            .query(&[("id", &id)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_empty_list_is_array() {
        let base = spawn_memory().await;
        let body = reqwest::get(format!("{}/lst", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_put_rejects_missing_fields() {
        let base = spawn_memory().await;
        let http = reqwest::Client::new();

        let response = http
            .post(format!("{}/put", base))
            .json(&json!({"title": "no description"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = http
            .post(format!("{}/put", base))
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn test_missing_id_is_bad_request() {
        let base = spawn_memory().await;
        let http = reqwest::Client::new();

        for (method, route) in [("GET", "get"), ("POST", "done"), ("POST", "del")] {
            let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();
            let response = http
                .request(method, format!("{}/{}", base, route))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "route /{}", route);
        }
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let base = spawn_memory().await;
        let http = reqwest::Client::new();

        for (method, route) in [("GET", "get"), ("POST", "done"), ("POST", "del")] {
            let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();
            let response = http
                .request(method, format!("{}/{}?id=missing", base, route))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "route /{}", route);
        }
    }

    #[tokio::test]
    async fn test_request_deadline() {
        let base = spawn(Arc::new(HangingRepository), Duration::from_millis(50)).await;

        let response = reqwest::get(format!("{}/lst", base)).await.unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "TIMEOUT");
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let base = spawn_memory().await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["healthy"], true);
        assert_eq!(body["backend"], "memory");
    }
}
