//! Authenticated HTTP wrapper around `reqwest`.
//!
//! Every request reads the token from storage and attaches it as a bearer
//! credential. A 401 from any endpoint removes the stored token and hands
//! control to the [`SessionInvalidator`] before the error is returned, so
//! callers never have to handle an expired session themselves.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::storage::{keys, ClientStorage, StorageError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session is no longer valid")]
    Unauthorized,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Text suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Tu sesion expiro, inicia sesion de nuevo.".to_string(),
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Network(_) => "No se pudo conectar con el servidor.".to_string(),
            ApiError::Decode(_) | ApiError::Storage(_) => self.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What happens to the rest of the client when the server rejects the token.
#[async_trait]
pub trait SessionInvalidator: Send + Sync {
    async fn session_invalidated(&self);
}

/// Invalidator for tooling that has no session to tear down.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

#[async_trait]
impl SessionInvalidator for NoopInvalidator {
    async fn session_invalidated(&self) {}
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn ClientStorage>,
    invalidator: Arc<dyn SessionInvalidator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        storage: Arc<dyn ClientStorage>,
        invalidator: Arc<dyn SessionInvalidator>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
            invalidator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.authorized(Method::GET, path).await?;
        decode(self.send(req).await?).await
    }

    /// GET with `query` serialized into the query string.
    pub async fn get_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.authorized(Method::GET, path).await?.query(query);
        decode(self.send(req).await?).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.authorized(Method::POST, path).await?.json(body);
        decode(self.send(req).await?).await
    }

    /// POST whose response body is ignored.
    pub async fn post_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.authorized(Method::POST, path).await?.json(body);
        self.send(req).await.map(drop)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.authorized(Method::PUT, path).await?.json(body);
        decode(self.send(req).await?).await
    }

    /// PUT whose response body is ignored.
    pub async fn put_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.authorized(Method::PUT, path).await?.json(body);
        self.send(req).await.map(drop)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.authorized(Method::DELETE, path).await?;
        self.send(req).await.map(drop)
    }

    /// DELETE whose response body is decoded.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.authorized(Method::DELETE, path).await?;
        decode(self.send(req).await?).await
    }

    /// Multipart upload of a single file field.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<T, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::Api {
                status: 0,
                message: format!("invalid content type {mime}: {e}"),
            })?;
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        let req = self.authorized(Method::POST, path).await?.multipart(form);
        decode(self.send(req).await?).await
    }

    /// POST without a bearer token and without 401 handling. Used for the
    /// login call, where a 401 means bad credentials rather than an expired
    /// session.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(check_status(resp).await?).await
    }

    async fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let mut req = self.http.request(method, self.url(path));
        let token = self.storage.get(keys::TOKEN).await?;
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %resp.url(), "request unauthorized; invalidating session");
            if let Err(err) = self.storage.remove(keys::TOKEN).await {
                tracing::warn!(error = %err, "failed to remove stored token");
            }
            self.invalidator.session_invalidated().await;
            return Err(ApiError::Unauthorized);
        }

        check_status(resp).await
    }
}

async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// The `message` or `error` field of a JSON error body, else the raw body,
/// else the status reason.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(text) = map.get(field).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
