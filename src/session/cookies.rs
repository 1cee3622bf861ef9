//! Cookie layout for the application token pair and the OAuth CSRF state.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::TokenPair;
use crate::config::CookiePolicy;

pub const ACCESS_COOKIE: &str = "aiTutorToken";
pub const REFRESH_COOKIE: &str = "refreshToken";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const OAUTH_STATE_TTL_MINUTES: i64 = 10;

fn scoped(name: &'static str, value: String, policy: &CookiePolicy) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(policy.secure)
        .build();
    if let Some(domain) = &policy.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Cookies carrying `tokens`. The refresh cookie is only emitted when a
/// refresh token was issued.
#[must_use]
pub fn session_cookies(policy: &CookiePolicy, tokens: &TokenPair) -> Vec<Cookie<'static>> {
    let mut cookies = vec![scoped(ACCESS_COOKIE, tokens.access_token.clone(), policy)];
    if let Some(refresh) = &tokens.refresh_token {
        cookies.push(scoped(REFRESH_COOKIE, refresh.clone(), policy));
    }
    cookies
}

/// Add the session cookies for `tokens` to `jar`.
#[must_use]
pub fn store_tokens(jar: CookieJar, policy: &CookiePolicy, tokens: &TokenPair) -> CookieJar {
    session_cookies(policy, tokens)
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie))
}

/// Overwrite both session cookies with expired, empty values.
#[must_use]
pub fn clear_tokens(jar: CookieJar, policy: &CookiePolicy) -> CookieJar {
    [ACCESS_COOKIE, REFRESH_COOKIE]
        .into_iter()
        .map(|name| {
            let mut cookie = scoped(name, String::new(), policy);
            cookie.set_max_age(Duration::ZERO);
            cookie
        })
        .fold(jar, |jar, cookie| jar.add(cookie))
}

/// Read the token pair back out of request cookies.
#[must_use]
pub fn tokens_from_jar(jar: &CookieJar) -> Option<TokenPair> {
    let access = jar
        .get(ACCESS_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())?;
    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned);
    Some(TokenPair::new(access, refresh))
}

/// Refresh token alone; present even when the access cookie was dropped.
#[must_use]
pub fn refresh_token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Short-lived CSRF state cookie for the OAuth redirect.
#[must_use]
pub fn oauth_state_cookie(state: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::minutes(OAUTH_STATE_TTL_MINUTES))
        .build()
}

#[must_use]
pub fn clear_oauth_state_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
