//! Auth routes: Google OAuth flow and cookie-held session management.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use crate::services::google;
use crate::session::{Session, TokenPair, cookies};
use crate::state::AppState;

/// What the page may read about its session. The refresh token stays in its
/// HttpOnly cookie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub access_token: String,
    pub has_refresh_token: bool,
}

impl From<&TokenPair> for SessionView {
    fn from(tokens: &TokenPair) -> Self {
        Self { access_token: tokens.access_token.clone(), has_refresh_token: tokens.refresh_token.is_some() }
    }
}

// =============================================================================
// OAUTH
// =============================================================================

/// `GET /auth/google`: redirect to the Google consent page.
pub async fn google_redirect(State(state): State<AppState>) -> Response {
    let Some(config) = &state.google else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Google sign-in not configured").into_response();
    };

    let oauth_state = google::generate_state();
    let url = match config.authorize_url(&oauth_state) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "google authorize url build failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Google sign-in misconfigured").into_response();
        }
    };

    let jar = CookieJar::new().add(cookies::oauth_state_cookie(oauth_state, state.config.cookies.secure));
    (jar, Redirect::temporary(&url)).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/google/callback`: verify state, exchange the code, sign in to
/// the backend, set the token cookies, redirect to the post-login page.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(config) = &state.google else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Google sign-in not configured").into_response();
    };
    let secure = state.config.cookies.secure;

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(error, "google sign-in declined");
        return (StatusCode::UNAUTHORIZED, "Google sign-in was not completed").into_response();
    }

    let Some(callback_state) = params.state.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing oauth state").into_response();
    };
    let expected_state = jar
        .get(cookies::OAUTH_STATE_COOKIE)
        .map(Cookie::value)
        .unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        return (StatusCode::UNAUTHORIZED, "invalid oauth state").into_response();
    }
    let Some(code) = params.code.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing authorization code").into_response();
    };

    let provider_token = match google::exchange_code(&state.oauth_http, config, code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            return (StatusCode::BAD_GATEWAY, "OAuth code exchange failed").into_response();
        }
    };

    let identity = match google::fetch_user(&state.oauth_http, config, &provider_token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "google user fetch failed");
            return (StatusCode::BAD_GATEWAY, "Failed to fetch Google profile").into_response();
        }
    };

    let tokens = match state.api.sign_in(&provider_token, &identity).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!(error = %e, code = e.code(), "backend sign-in failed");
            return (StatusCode::BAD_GATEWAY, "Sign-in with the tutor service failed").into_response();
        }
    };
    let session = Session { identity, tokens };
    tracing::info!(email = %session.identity.email, "session established");

    let jar = cookies::store_tokens(jar, &state.config.cookies, &session.tokens)
        .add(cookies::clear_oauth_state_cookie(secure));
    (jar, Redirect::temporary(&state.config.post_login_redirect)).into_response()
}

// =============================================================================
// SESSION
// =============================================================================

/// `GET /api/auth/session`: the access token to mirror into the bearer header.
pub async fn session(jar: CookieJar) -> Result<Json<SessionView>, StatusCode> {
    let tokens = cookies::tokens_from_jar(&jar).ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(SessionView::from(&tokens)))
}

/// `POST /api/auth/refresh`: rotate the pair using the refresh cookie.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let policy = &state.config.cookies;
    let Some(refresh_token) = cookies::refresh_token_from_jar(&jar) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match state.api.refresh_session(&refresh_token).await {
        Ok(mut tokens) => {
            if tokens.refresh_token.is_none() {
                tokens.refresh_token = Some(refresh_token);
            }
            let view = SessionView::from(&tokens);
            let jar = cookies::store_tokens(jar, policy, &tokens);
            (jar, Json(view)).into_response()
        }
        Err(e) if e.is_rejection() => {
            tracing::info!(error = %e, "refresh token rejected; clearing session cookies");
            (cookies::clear_tokens(jar, policy), StatusCode::UNAUTHORIZED).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.code(), "token refresh failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// `POST /api/auth/logout`: clear both token cookies.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (cookies::clear_tokens(jar, &state.config.cookies), StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
