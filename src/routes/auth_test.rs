use super::*;
use crate::api::test_support::{Stub, serve_router};
use crate::config::{AppConfig, CookiePolicy};
use crate::routes::app;
use crate::services::google::GoogleConfig;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use serde_json::{Value, json};

fn google(base: &str) -> GoogleConfig {
    GoogleConfig {
        client_id: "client-123".into(),
        client_secret: "shh".into(),
        redirect_uri: "http://localhost:3000/auth/google/callback".into(),
        auth_url: format!("{base}/o/oauth2/v2/auth"),
        token_url: format!("{base}/token"),
        userinfo_url: format!("{base}/userinfo"),
    }
}

async fn server(backend: &str, google_config: Option<GoogleConfig>, cookies: CookiePolicy) -> String {
    let mut config = AppConfig::for_base_url(backend);
    config.cookies = cookies;
    let state = AppState::new(config, google_config).unwrap();
    serve_router(app(state)).await
}

fn dev_cookies() -> CookiePolicy {
    CookiePolicy { secure: false, domain: None }
}

fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn set_cookies(resp: &reqwest::Response) -> Vec<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

fn cookie_named<'a>(cookies: &'a [String], name: &str) -> &'a str {
    cookies
        .iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .unwrap_or_else(|| panic!("no {name} cookie in {cookies:?}"))
}

#[tokio::test]
async fn healthz_is_ok() {
    let base = server("http://127.0.0.1:9", None, dev_cookies()).await;
    let resp = http().get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn google_redirect_without_config_is_unavailable() {
    let base = server("http://127.0.0.1:9", None, dev_cookies()).await;
    let resp = http().get(format!("{base}/auth/google")).send().await.unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn google_redirect_sets_state_cookie_matching_url() {
    let base = server("http://127.0.0.1:9", Some(google("https://accounts.example")), dev_cookies()).await;
    let resp = http().get(format!("{base}/auth/google")).send().await.unwrap();

    assert_eq!(resp.status(), 307);
    let location = resp.headers()[LOCATION].to_str().unwrap().to_owned();
    let cookies = set_cookies(&resp);
    let state_cookie = cookie_named(&cookies, "oauth_state");
    let state_value = state_cookie
        .trim_start_matches("oauth_state=")
        .split(';')
        .next()
        .unwrap();

    assert!(location.starts_with("https://accounts.example/o/oauth2/v2/auth?"));
    assert!(location.contains(&format!("state={state_value}")));
    assert!(state_cookie.contains("HttpOnly"));
    assert!(state_cookie.contains("Max-Age=600"));
}

#[tokio::test]
async fn callback_rejects_mismatched_state() {
    let base = server("http://127.0.0.1:9", Some(google("https://accounts.example")), dev_cookies()).await;
    let resp = http()
        .get(format!("{base}/auth/google/callback?code=c&state=forged"))
        .header(COOKIE, "oauth_state=expected")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn callback_signs_in_and_sets_token_cookies() {
    let upstream = Stub::new();
    upstream.respond("POST", "/token", 200, json!({ "access_token": "g-token" }));
    upstream.respond("GET", "/userinfo", 200, json!({ "sub": "1098", "email": "kim@univ.ac.kr" }));
    upstream.respond(
        "POST",
        "/api/v1/auth/sign-in",
        200,
        json!({ "accessToken": "app-access", "refreshToken": "app-refresh" }),
    );
    let upstream_base = upstream.serve().await;
    let policy = CookiePolicy { secure: true, domain: Some(".ai-tutor.co.kr".into()) };
    let base = server(&upstream_base, Some(google(&upstream_base)), policy).await;

    let resp = http()
        .get(format!("{base}/auth/google/callback?code=c&state=s1"))
        .header(COOKIE, "oauth_state=s1")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 307);
    assert_eq!(resp.headers()[LOCATION], "/home");
    let cookies = set_cookies(&resp);
    let access = cookie_named(&cookies, "aiTutorToken");
    assert!(access.starts_with("aiTutorToken=app-access"));
    for attr in ["HttpOnly", "SameSite=Lax", "Secure", "Path=/", "Domain=ai-tutor.co.kr"] {
        assert!(access.contains(attr), "{attr} missing from {access}");
    }
    assert!(cookie_named(&cookies, "refreshToken").starts_with("refreshToken=app-refresh"));
    assert!(cookie_named(&cookies, "oauth_state").contains("Max-Age=0"));

    let sign_in = &upstream.hits_for("POST", "/api/v1/auth/sign-in")[0];
    assert_eq!(sign_in.authorization.as_deref(), Some("Bearer g-token"));
    assert_eq!(sign_in.json(), json!({ "email": "kim@univ.ac.kr", "providerId": "1098" }));
}

#[tokio::test]
async fn callback_without_refresh_token_sets_only_access_cookie() {
    let upstream = Stub::new();
    upstream.respond("POST", "/token", 200, json!({ "access_token": "g-token" }));
    upstream.respond("GET", "/userinfo", 200, json!({ "sub": "1", "email": "a@b.c" }));
    upstream.respond("POST", "/api/v1/auth/sign-in", 200, json!({ "accessToken": "only-access" }));
    let upstream_base = upstream.serve().await;
    let base = server(&upstream_base, Some(google(&upstream_base)), dev_cookies()).await;

    let resp = http()
        .get(format!("{base}/auth/google/callback?code=c&state=s1"))
        .header(COOKIE, "oauth_state=s1")
        .send()
        .await
        .unwrap();

    let cookies = set_cookies(&resp);
    assert!(cookies.iter().any(|c| c.starts_with("aiTutorToken=only-access")));
    assert!(!cookies.iter().any(|c| c.starts_with("refreshToken=")));
    assert!(!cookie_named(&cookies, "aiTutorToken").contains("Secure"));
}

#[tokio::test]
async fn callback_backend_failure_is_bad_gateway() {
    let upstream = Stub::new();
    upstream.respond("POST", "/token", 200, json!({ "access_token": "g-token" }));
    upstream.respond("GET", "/userinfo", 200, json!({ "sub": "1", "email": "a@b.c" }));
    upstream.respond("POST", "/api/v1/auth/sign-in", 500, json!({ "message": "down" }));
    let upstream_base = upstream.serve().await;
    let base = server(&upstream_base, Some(google(&upstream_base)), dev_cookies()).await;

    let resp = http()
        .get(format!("{base}/auth/google/callback?code=c&state=s1"))
        .header(COOKIE, "oauth_state=s1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    assert!(set_cookies(&resp).is_empty());
}

#[tokio::test]
async fn session_reports_access_token_from_cookie() {
    let base = server("http://127.0.0.1:9", None, dev_cookies()).await;

    let resp = http()
        .get(format!("{base}/api/auth/session"))
        .header(COOKIE, "aiTutorToken=a1; refreshToken=r1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "accessToken": "a1", "hasRefreshToken": true }));

    let anonymous = http().get(format!("{base}/api/auth/session")).send().await.unwrap();
    assert_eq!(anonymous.status(), 401);
}

#[tokio::test]
async fn refresh_rotates_cookies() {
    let backend = Stub::new();
    backend.respond("POST", "/api/v1/auth/refresh", 200, json!({ "accessToken": "a2" }));
    let base = server(&backend.serve().await, None, dev_cookies()).await;

    let resp = http()
        .post(format!("{base}/api/auth/refresh"))
        .header(COOKIE, "aiTutorToken=a1; refreshToken=r1")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let cookies = set_cookies(&resp);
    assert!(cookie_named(&cookies, "aiTutorToken").starts_with("aiTutorToken=a2"));
    assert!(cookie_named(&cookies, "refreshToken").starts_with("refreshToken=r1"));
    assert_eq!(backend.hits()[0].json(), json!({ "refreshToken": "r1" }));
}

#[tokio::test]
async fn rejected_refresh_clears_cookies() {
    let backend = Stub::new();
    backend.respond("POST", "/api/v1/auth/refresh", 401, json!({ "message": "expired" }));
    let base = server(&backend.serve().await, None, dev_cookies()).await;

    let resp = http()
        .post(format!("{base}/api/auth/refresh"))
        .header(COOKIE, "refreshToken=r1")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let cookies = set_cookies(&resp);
    assert!(cookie_named(&cookies, "aiTutorToken").contains("Max-Age=0"));
    assert!(cookie_named(&cookies, "refreshToken").contains("Max-Age=0"));
}

#[tokio::test]
async fn unavailable_refresh_keeps_cookies() {
    let backend = Stub::new();
    backend.respond("POST", "/api/v1/auth/refresh", 503, json!({ "message": "maintenance" }));
    let base = server(&backend.serve().await, None, dev_cookies()).await;

    let resp = http()
        .post(format!("{base}/api/auth/refresh"))
        .header(COOKIE, "aiTutorToken=a1; refreshToken=r1")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    assert!(set_cookies(&resp).is_empty());
}

#[tokio::test]
async fn logout_clears_both_cookies() {
    let base = server("http://127.0.0.1:9", None, dev_cookies()).await;
    let resp = http()
        .post(format!("{base}/api/auth/logout"))
        .header(COOKIE, "aiTutorToken=a1; refreshToken=r1")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 204);
    let cookies = set_cookies(&resp);
    assert!(cookie_named(&cookies, "aiTutorToken").contains("Max-Age=0"));
    assert!(cookie_named(&cookies, "refreshToken").contains("Max-Age=0"));
}
