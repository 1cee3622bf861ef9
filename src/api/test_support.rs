//! Scripted in-process HTTP stub for client and route tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::ApiClient;
use crate::config::HttpTimeouts;

/// One request the stub received.
#[derive(Debug, Clone)]
pub(crate) struct Hit {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Hit {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct StubInner {
    hits: Mutex<Vec<Hit>>,
    script: Mutex<HashMap<String, VecDeque<(u16, Value)>>>,
}

/// Responses are queued per `METHOD /path`; the last queued response repeats.
#[derive(Clone, Default)]
pub(crate) struct Stub {
    inner: Arc<StubInner>,
}

fn key(method: &str, path: &str) -> String {
    format!("{method} {path}")
}

impl Stub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.inner
            .script
            .lock()
            .unwrap()
            .entry(key(method, path))
            .or_default()
            .push_back((status, body));
        self
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.inner.hits.lock().unwrap().clone()
    }

    pub fn hits_for(&self, method: &str, path: &str) -> Vec<Hit> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.method == method && hit.path == path)
            .collect()
    }

    /// Bind to an ephemeral port and return the base URL.
    pub async fn serve(&self) -> String {
        let router = Router::new()
            .fallback(handle)
            .with_state(self.clone());
        serve_router(router).await
    }
}

pub(crate) async fn serve_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("stub should bind");
    let addr = listener.local_addr().expect("stub should have an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

async fn handle(State(stub): State<Stub>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let header = |name: axum::http::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
    };
    let hit = Hit {
        method: method.to_string(),
        path: uri.path().to_owned(),
        query: uri.query().map(ToOwned::to_owned),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body: body.to_vec(),
    };
    let script_key = key(&hit.method, &hit.path);
    stub.inner.hits.lock().unwrap().push(hit);

    let scripted = {
        let mut script = stub.inner.script.lock().unwrap();
        script.get_mut(&script_key).and_then(|queue| {
            if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
        })
    };
    let (status, body) = scripted.unwrap_or((404, serde_json::json!({ "message": "no stub" })));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = if body.is_null() { String::new() } else { body.to_string() };
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

pub(crate) fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, HttpTimeouts { request_secs: 5, connect_secs: 2 }).expect("client should build")
}
