//! Shared application state for the auth server.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds typed config, the optional Google OAuth config, an outbound HTTP
//! client for Google, and an `ApiClient` used only for token exchange. The
//! server keeps no per-user state; tokens travel in cookies.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::AppConfig;
use crate::services::google::GoogleConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub google: Option<Arc<GoogleConfig>>,
    pub oauth_http: reqwest::Client,
    pub api: ApiClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: AppConfig, google: Option<GoogleConfig>) -> Result<Self, ApiError> {
        let api = ApiClient::from_config(&config)?;
        let oauth_http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { config: Arc::new(config), google: google.map(Arc::new), oauth_http, api })
    }
}
