//! Token exchange endpoints. These bypass the stored bearer token and the
//! 401 recovery path: they are how credentials are obtained in the first place.

use serde::Serialize;

use super::{ApiClient, ApiError, error_message};
use crate::session::{Identity, TokenPair};

pub const SIGN_IN_PATH: &str = "/api/v1/auth/sign-in";
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    provider_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl ApiClient {
    /// Exchange an OAuth provider access token for an application token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the provider token or answers
    /// without an access token.
    pub async fn sign_in(&self, provider_token: &str, identity: &Identity) -> Result<TokenPair, ApiError> {
        let body = SignInRequest { email: &identity.email, provider_id: &identity.provider_id };
        let response = self
            .http()
            .post(self.url(SIGN_IN_PATH))
            .bearer_auth(provider_token)
            .json(&body)
            .send()
            .await?;
        let tokens = decode_tokens(response).await?;
        tracing::info!(email = %identity.email, "backend sign-in succeeded");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new pair without touching stored tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the refresh token.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        request_refresh(self.http(), self.base_url(), refresh_token).await
    }
}

pub(crate) async fn request_refresh(
    http: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<TokenPair, ApiError> {
    let response = http
        .post(format!("{base_url}{REFRESH_PATH}"))
        .json(&RefreshRequest { refresh_token })
        .send()
        .await?;
    decode_tokens(response).await
}

async fn decode_tokens(response: reqwest::Response) -> Result<TokenPair, ApiError> {
    let status = response.status();
    let text = response.text().await?;
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), message: error_message(&text) });
    }
    let tokens: TokenPair = serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
    if tokens.access_token.is_empty() {
        return Err(ApiError::Decode("response carried no access token".to_owned()));
    }
    Ok(tokens)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
