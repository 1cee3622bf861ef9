//! Session model: the application token pair and the identity it was issued to.
//!
//! ARCHITECTURE
//! ============
//! A Google sign-in yields a provider access token. The backend exchanges it
//! for an application token pair, which the auth server stores in HttpOnly
//! cookies (`cookies`) and API callers mirror into the bearer header
//! (`crate::api::ApiClient::set_tokens`). The CLI keeps the same pair in a
//! credentials file (`store`). Nothing here outlives the browser or CLI
//! session; there is no server-side session table.

pub mod cookies;
pub mod store;

use serde::{Deserialize, Serialize};

/// Application-issued credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token }
    }
}

// Tokens never reach logs through `{:?}`.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Third-party identity reported by the OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    pub provider_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A signed-in professor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub tokens: TokenPair,
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
