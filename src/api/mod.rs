//! Backend REST client.
//!
//! DESIGN
//! ======
//! One `reqwest` client per `ApiClient`, a fixed base URL, and a JSON
//! content-type default. The access token of the current token pair is sent
//! as a bearer header on every request.
//!
//! AUTH RECOVERY
//! =============
//! A 401 triggers at most one credential refresh followed by exactly one
//! resubmission of the original request. Refresh is single-flight: a caller
//! whose token was already replaced by a concurrent refresh retries with the
//! replacement instead of refreshing again. A 401 on the resubmission, a
//! missing refresh token, or a failed refresh ends in an error. Only a
//! refresh the backend rejects drops the stored pair.

pub mod auth;
pub mod folders;
pub mod notes;
pub mod practice;
pub mod summaries;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::config::{AppConfig, HttpTimeouts, normalize_base_url};
use crate::session::TokenPair;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Credentials are missing or were rejected after one refresh.
    #[error("not signed in or session expired")]
    Unauthorized,

    /// The refresh endpoint rejected the refresh token or could not be reached.
    #[error("credential refresh failed: {0}")]
    RefreshFailed(String),

    #[error("request body encode failed: {0}")]
    Encode(String),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("file read failed: {0}")]
    File(#[from] std::io::Error),
}

impl ApiError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_API_REQUEST",
            Self::Status { .. } => "E_API_STATUS",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::RefreshFailed(_) => "E_REFRESH_FAILED",
            Self::Encode(_) => "E_ENCODE",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::File(_) => "E_FILE",
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(status, 429 | 500..=599),
            _ => false,
        }
    }

    /// The backend refused the credentials, as opposed to failing to answer.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Status { status: 400..=499, .. })
    }

    /// HTTP status for `Status` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// A file sent as the multipart `file` field.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read `path` into memory so the upload can be resent after a refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_owned();
        let mime = mime_for(path);
        Ok(Self { file_name, mime, bytes })
    }

    fn to_form(&self) -> Result<reqwest::multipart::Form, ApiError> {
        let part = reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(self.mime)?;
        Ok(reqwest::multipart::Form::new().part("file", part))
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("webm") => "audio/webm",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Json(Value),
    Upload(Upload),
}

/// A request description that can be dispatched more than once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub payload: Payload,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), payload: Payload::Empty }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.payload = Payload::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn upload(mut self, upload: Upload) -> Self {
        self.payload = Payload::Upload(upload);
        self
    }
}

// =============================================================================
// REFRESH
// =============================================================================

/// Exchanges a refresh token for a new token pair.
#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError>;
}

/// Calls the backend refresh endpoint without bearer auth or retries.
struct BackendRefresher {
    http: reqwest::Client,
    base_url: String,
}

#[async_trait::async_trait]
impl TokenRefresher for BackendRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        auth::request_refresh(&self.http, &self.base_url, refresh_token).await
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Shared backend client. Clones share the token pair and refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<RwLock<Option<TokenPair>>>,
    refresh_gate: Arc<Mutex<()>>,
    refresher: Arc<dyn TokenRefresher>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let base_url = normalize_base_url(base_url);
        let refresher = Arc::new(BackendRefresher { http: http.clone(), base_url: base_url.clone() });
        Ok(Self {
            http,
            base_url,
            tokens: Arc::new(RwLock::new(None)),
            refresh_gate: Arc::new(Mutex::new(())),
            refresher,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.timeouts)
    }

    /// Replace the refresh strategy.
    #[must_use]
    pub fn with_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = refresher;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Mirror a token pair into the bearer header, or drop it with `None`.
    pub async fn set_tokens(&self, tokens: Option<TokenPair>) {
        *self.tokens.write().await = tokens;
    }

    /// Current token pair, including any refresh performed since it was set.
    pub async fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request` and decode a JSON response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, an
    /// unrecoverable 401, or an undecodable body.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let text = self.send_text(request).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{e}: {}", preview(&text))))
    }

    /// Send `request` and return the body as loose JSON (`Null` when empty).
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send`].
    pub async fn send_value(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let text = self.send_text(request).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{e}: {}", preview(&text))))
    }

    async fn send_text(&self, request: ApiRequest) -> Result<String, ApiError> {
        let response = self.execute(&request).await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::debug!(method = %request.method, path = %request.path, status = status.as_u16(), "api error status");
            return Err(ApiError::Status { status: status.as_u16(), message: error_message(&text) });
        }
        Ok(text)
    }

    /// Dispatch with the current bearer token, refreshing and resubmitting
    /// once on 401.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unrecoverable 401.
    pub async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let sent_with = self.access_token().await;
        let response = self.dispatch(request, sent_with.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!(method = %request.method, path = %request.path, "api request unauthorized; refreshing credentials");
        let Some(token) = self.refresh_credentials(sent_with.as_deref()).await? else {
            return Err(ApiError::Unauthorized);
        };

        let retried = self.dispatch(request, Some(&token)).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(method = %request.method, path = %request.path, "api request still unauthorized after refresh");
            return Err(ApiError::Unauthorized);
        }
        Ok(retried)
    }

    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<reqwest::Response, ApiError> {
        tracing::debug!(method = %request.method, path = %request.path, "api request");
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(body),
            Payload::Upload(upload) => builder.multipart(upload.to_form()?),
        };
        Ok(builder.send().await?)
    }

    /// Returns the token to retry with, or `None` when no refresh is possible.
    async fn refresh_credentials(&self, stale: Option<&str>) -> Result<Option<String>, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        let Some(current) = self.tokens().await else {
            return Ok(None);
        };
        if stale != Some(current.access_token.as_str()) {
            // Replaced while this request was in flight.
            return Ok(Some(current.access_token));
        }
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            return Ok(None);
        };

        match self.refresher.refresh(refresh_token).await {
            Ok(mut fresh) => {
                if fresh.refresh_token.is_none() {
                    fresh.refresh_token = current.refresh_token.clone();
                }
                let access = fresh.access_token.clone();
                *self.tokens.write().await = Some(fresh);
                tracing::info!("credentials refreshed");
                Ok(Some(access))
            }
            Err(e) if e.is_rejection() => {
                tracing::warn!(error = %e, "refresh token rejected; dropping session");
                *self.tokens.write().await = None;
                Err(ApiError::RefreshFailed(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "credential refresh unavailable; keeping session");
                Err(ApiError::RefreshFailed(e.to_string()))
            }
        }
    }
}

/// Prefer the backend's `message` field; fall back to a body preview.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| preview(body))
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_PREVIEW_CHARS {
        return trimmed.to_owned();
    }
    let cut: String = trimmed.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
