//! REST client for the signage backend.
//!
//! Implements both [`LayoutRepository`] and [`CatalogSource`] on top of
//! [`reqwest`]:
//!
//! | Operation        | Request                      |
//! |------------------|------------------------------|
//! | create layout    | `POST {base}/layouts`        |
//! | replace layout   | `PUT {base}/layouts/{id}`    |
//! | fetch layout     | `GET {base}/layouts/{id}`    |
//! | content catalog  | `GET {base}/content`         |
//! | playlist catalog | `GET {base}/playlists`       |
//!
//! Every request carries a fresh `X-Request-Id` so overlapping saves can be
//! told apart in backend logs.

use async_trait::async_trait;
use layout_core::LayoutRecord;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::application::catalog::{CatalogError, CatalogSource, ContentItem, PlaylistItem};
use crate::application::save_layout::{LayoutId, LayoutRepository, RepositoryError};
use crate::infrastructure::storage::config::ApiConfig;

/// Header used to correlate a request with backend logs.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct HttpLayoutClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

/// Failure of a single request, before it is mapped to a caller's error type.
#[derive(Debug)]
enum RequestFailure {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
    Body(String),
}

/// List responses come either bare or wrapped in `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

impl HttpLayoutClient {
    /// Builds a client from the `[api]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Transport`] if the underlying HTTP client
    /// cannot be constructed (e.g. TLS backend initialisation failed).
    pub fn new(config: &ApiConfig) -> Result<Self, RepositoryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config.base_url.clone(), config.auth_token.clone()))
    }

    /// Creates a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, auth_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Adds auth and correlation headers to `request`.
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        let request = request.header(REQUEST_ID_HEADER, request_id.to_string());
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, RequestFailure> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(RequestFailure::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RequestFailure::Status { status, body });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestFailure> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RequestFailure::Body(e.to_string()))
    }

    fn repository_error(failure: RequestFailure, id: Option<&LayoutId>) -> RepositoryError {
        match failure {
            RequestFailure::Transport(e) => RepositoryError::Transport(e.to_string()),
            RequestFailure::Status { status, .. } if status == StatusCode::NOT_FOUND && id.is_some() => {
                RepositoryError::NotFound(id.cloned().unwrap_or_else(|| LayoutId::new("")))
            }
            RequestFailure::Status { status, body } => RepositoryError::Api {
                status: status.as_u16(),
                body,
            },
            RequestFailure::Body(e) => RepositoryError::Malformed(e),
        }
    }

    fn catalog_error(failure: RequestFailure) -> CatalogError {
        match failure {
            RequestFailure::Transport(e) => CatalogError::Unavailable(e.to_string()),
            RequestFailure::Status { status, body } => CatalogError::Api {
                status: status.as_u16(),
                body,
            },
            RequestFailure::Body(e) => CatalogError::Malformed(e),
        }
    }
}

/// Pulls the new layout id out of a create response.
///
/// Accepts `{"id": 12}`, `{"id": "abc"}` and the same wrapped in `"data"`.
fn created_id(body: &Value) -> Option<LayoutId> {
    let id = body.get("id").or_else(|| body.get("data").and_then(|d| d.get("id")))?;
    match id {
        Value::String(s) if !s.is_empty() => Some(LayoutId::new(s.clone())),
        Value::Number(n) => Some(LayoutId::new(n.to_string())),
        _ => None,
    }
}

/// Layout responses may be bare or wrapped in `{"data": {...}}`.
fn unwrap_layout(body: Value) -> Result<LayoutRecord, serde_json::Error> {
    let inner = match body {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("zones") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner)
}

#[async_trait]
impl LayoutRepository for HttpLayoutClient {
    async fn create(&self, record: &LayoutRecord) -> Result<LayoutId, RepositoryError> {
        let request = self.client.post(self.url("layouts")).json(record);
        let response = self
            .execute(request)
            .await
            .map_err(|f| Self::repository_error(f, None))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| RepositoryError::Malformed(e.to_string()))?;
        let id = created_id(&body)
            .ok_or_else(|| RepositoryError::Malformed(format!("create response has no id: {body}")))?;
        debug!("backend created layout {id}");
        Ok(id)
    }

    async fn replace(&self, id: &LayoutId, record: &LayoutRecord) -> Result<(), RepositoryError> {
        let request = self.client.put(self.url(&format!("layouts/{id}"))).json(record);
        self.execute(request)
            .await
            .map_err(|f| Self::repository_error(f, Some(id)))?;
        debug!("backend replaced layout {id}");
        Ok(())
    }

    async fn fetch(&self, id: &LayoutId) -> Result<LayoutRecord, RepositoryError> {
        let body: Value = self
            .get_json(&format!("layouts/{id}"))
            .await
            .map_err(|f| Self::repository_error(f, Some(id)))?;
        unwrap_layout(body).map_err(|e| RepositoryError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for HttpLayoutClient {
    async fn fetch_content(&self) -> Result<Vec<ContentItem>, CatalogError> {
        let listing: Listing<ContentItem> = self.get_json("content").await.map_err(Self::catalog_error)?;
        Ok(listing.into_items())
    }

    async fn fetch_playlists(&self) -> Result<Vec<PlaylistItem>, CatalogError> {
        let listing: Listing<PlaylistItem> = self.get_json("playlists").await.map_err(Self::catalog_error)?;
        Ok(listing.into_items())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
