//! Google OAuth service: authorization URL, code exchange, profile fetch.

use std::fmt::Write as _;

use rand::Rng;
use reqwest::Url;
use serde::Deserialize;

use crate::session::Identity;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const SCOPES: &str = "openid email profile";

/// Google OAuth configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    /// Load from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`.
    /// Returns `None` if any are missing (sign-in will be disabled).
    ///
    /// `GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL` and `GOOGLE_USERINFO_URL`
    /// override the Google endpoints.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI").ok()?;
        let endpoint = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_owned());
        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
            auth_url: endpoint("GOOGLE_AUTH_URL", GOOGLE_AUTH_URL),
            token_url: endpoint("GOOGLE_TOKEN_URL", GOOGLE_TOKEN_URL),
            userinfo_url: endpoint("GOOGLE_USERINFO_URL", GOOGLE_USERINFO_URL),
        })
    }

    /// Build the Google authorization URL carrying the CSRF `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization endpoint is not a URL.
    pub fn authorize_url(&self, state: &str) -> Result<String, GoogleAuthError> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| GoogleAuthError::Config(e.to_string()))?;
        Ok(url.into())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GoogleAuthError {
    #[error("google oauth misconfigured: {0}")]
    Config(String),
    #[error("google token exchange failed: {0}")]
    TokenExchange(String),
    #[error("google userinfo error: {0}")]
    UserInfo(String),
    #[error("google account has no email address")]
    MissingEmail,
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Random 32-byte hex token for the OAuth `state` parameter.
#[must_use]
pub fn generate_state() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Exchange an authorization code for a Google access token.
///
/// # Errors
///
/// Returns an error if Google rejects the code or answers without a token.
pub async fn exchange_code(http: &reqwest::Client, config: &GoogleConfig, code: &str) -> Result<String, GoogleAuthError> {
    let resp = http
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| GoogleAuthError::TokenExchange(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| GoogleAuthError::TokenExchange(e.to_string()))?;
    if !status.is_success() {
        return Err(GoogleAuthError::TokenExchange(format!("{status}: {body}")));
    }
    let token_resp: TokenResponse = serde_json::from_str(&body)
        .map_err(|_| GoogleAuthError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

/// Fetch the signed-in Google account as an [`Identity`].
///
/// # Errors
///
/// Returns an error if the profile cannot be fetched or has no email.
pub async fn fetch_user(
    http: &reqwest::Client,
    config: &GoogleConfig,
    access_token: &str,
) -> Result<Identity, GoogleAuthError> {
    let resp = http
        .get(&config.userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| GoogleAuthError::UserInfo(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleAuthError::UserInfo(format!("{status}: {body}")));
    }

    let user = resp
        .json::<GoogleUser>()
        .await
        .map_err(|e| GoogleAuthError::UserInfo(e.to_string()))?;
    let email = user
        .email
        .filter(|email| !email.is_empty())
        .ok_or(GoogleAuthError::MissingEmail)?;
    Ok(Identity { email, provider_id: user.sub, name: user.name })
}

#[cfg(test)]
#[path = "google_test.rs"]
mod tests;
