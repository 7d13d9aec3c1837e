//! In-process mock of the search server, for integration tests.
//!
//! Behaviour:
//! - `GET /stats` → `{num_docs, indexed}` (indexed mirrors num_docs)
//! - `GET /health` → `{"status": "ok"}`
//! - `POST /load_demo` → adds 2 docs
//! - `POST /reset` → clears docs
//! - `POST /upload` → multipart field `file`; names containing `bad` get a 422
//! - `GET /search` → `q=boom` gets a 500, `q` containing `none` gets `{}`,
//!   anything else one hit whose snippet echoes the query

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Path plus raw query string, as sent.
    pub uri: String,
    /// `(field name, file name)` of each multipart part.
    pub parts: Vec<(String, Option<String>)>,
}

#[derive(Default)]
struct Inner {
    docs: usize,
    requests: Vec<Recorded>,
}

#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn uris(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.uri).collect()
    }

    fn record(&self, method: Method, uri: &Uri, parts: Vec<(String, Option<String>)>) {
        self.inner.lock().unwrap().requests.push(Recorded {
            method,
            uri: uri.to_string(),
            parts,
        });
    }
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/health", get(health))
        .route("/load_demo", post(load_demo))
        .route("/reset", post(reset))
        .route("/upload", post(upload))
        .route("/search", get(search))
        .with_state(state)
}

/// Serve on the current tokio runtime.
pub async fn spawn() -> MockServer {
    let state = MockState::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockServer { addr, state }
}

/// Serve from a background thread with its own runtime, for tests that
/// run the `pdfs` binary synchronously.
pub fn spawn_in_thread() -> MockServer {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let server = spawn().await;
            tx.send((server.addr, server.state.clone())).unwrap();
            std::future::pending::<()>().await;
        });
    });
    let (addr, state) = rx.recv().unwrap();
    MockServer { addr, state }
}

async fn stats(State(state): State<MockState>, uri: Uri) -> Json<serde_json::Value> {
    state.record(Method::GET, &uri, vec![]);
    let docs = state.inner.lock().unwrap().docs;
    Json(json!({"num_docs": docs, "indexed": docs}))
}

async fn health(State(state): State<MockState>, uri: Uri) -> Json<serde_json::Value> {
    state.record(Method::GET, &uri, vec![]);
    Json(json!({"status": "ok"}))
}

async fn load_demo(
    State(state): State<MockState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    state.record(Method::POST, &uri, vec![]);
    state.inner.lock().unwrap().docs += 2;
    Json(json!({"loaded": 2, "max_pages": params.get("max_pages")}))
}

async fn reset(State(state): State<MockState>, uri: Uri) -> Json<serde_json::Value> {
    state.record(Method::POST, &uri, vec![]);
    state.inner.lock().unwrap().docs = 0;
    Json(json!({"ok": true}))
}

async fn upload(State(state): State<MockState>, uri: Uri, mut multipart: Multipart) -> Response {
    let mut parts = Vec::new();
    let mut upload: Option<(String, usize)> = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        parts.push((name.clone(), file_name.clone()));
        if name == "file" {
            upload = Some((file_name.unwrap_or_default(), bytes.len()));
        }
    }
    state.record(Method::POST, &uri, parts);

    match upload {
        None => (StatusCode::BAD_REQUEST, "missing file field").into_response(),
        Some((name, _)) if name.contains("bad") => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Only PDF files are supported",
        )
            .into_response(),
        Some((name, len)) => {
            state.inner.lock().unwrap().docs += 1;
            Json(json!({"filename": name, "text_chars": len})).into_response()
        }
    }
}

async fn search(
    State(state): State<MockState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(Method::GET, &uri, vec![]);
    let q = params.get("q").cloned().unwrap_or_default();
    if q == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "search exploded").into_response();
    }
    if q.contains("none") {
        return Json(json!({})).into_response();
    }
    Json(json!({
        "results": [{
            "filename": "doc's.pdf",
            "score": 0.5,
            "doc_id": 7,
            "snippet": format!("<b>{}</b> & more", q),
        }]
    }))
    .into_response()
}
