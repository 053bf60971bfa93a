//! In-process stand-in for the AlbertAPI, served on an ephemeral port.

#![allow(dead_code)]

use albert_rag::config::{ApiConfig, Config, IngestConfig, RetrievalConfig};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const COLLECTION: &str = "coll-1";
pub const API_KEY: &str = "test-key";

#[derive(Default)]
pub struct FakeState {
    /// Names returned by the listing; successful uploads are appended.
    pub existing: Mutex<Vec<String>>,
    /// File names received by `POST /files`, in arrival order.
    pub uploads: Mutex<Vec<String>>,
    pub fail_uploads: Mutex<HashSet<String>>,
    pub upload_bodies: Mutex<Vec<Vec<u8>>>,
    pub list_calls: AtomicUsize,
    pub fail_list: AtomicBool,

    pub search_chunks: Mutex<Vec<String>>,
    pub search_requests: Mutex<Vec<Value>>,
    pub fail_search: AtomicBool,

    pub completion_requests: Mutex<Vec<Value>>,
    pub fail_completion: AtomicBool,

    pub auth_headers: Mutex<Vec<String>>,
}

impl FakeState {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn completion_requests(&self) -> Vec<Value> {
        self.completion_requests.lock().unwrap().clone()
    }

    pub fn search_requests(&self) -> Vec<Value> {
        self.search_requests.lock().unwrap().clone()
    }
}

pub struct FakeAlbert {
    pub state: Arc<FakeState>,
    /// `http://127.0.0.1:<port>`, the API root (version segment excluded).
    pub root: String,
}

impl FakeAlbert {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/v1/documents/{collection}", get(list_documents))
            .route("/v1/files", post(upload_file))
            .route("/v1/search", post(search))
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let root = serve(app).await;
        Self { state, root }
    }

    /// Config pointing at this fake, with `ingest_root` as the source tree.
    pub fn config(&self, ingest_root: Option<PathBuf>) -> Config {
        Config {
            api: ApiConfig {
                root: self.root.clone(),
                version: "v1".to_string(),
                key: API_KEY.to_string(),
                timeout_secs: Some(10),
            },
            retrieval: RetrievalConfig {
                collection_id: COLLECTION.to_string(),
                ..RetrievalConfig::default()
            },
            ingest: IngestConfig {
                root: ingest_root.unwrap_or_else(|| PathBuf::from(".")),
                ..IngestConfig::default()
            },
            ..Config::default()
        }
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn record_auth(state: &FakeState, headers: &HeaderMap) {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.auth_headers.lock().unwrap().push(value);
}

async fn list_documents(
    State(state): State<Arc<FakeState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    record_auth(&state, &headers);
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_list.load(Ordering::SeqCst) || collection != COLLECTION {
        return (StatusCode::NOT_FOUND, "collection not found").into_response();
    }
    let data: Vec<Value> = state
        .existing
        .lock()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "id": i, "name": name, "object": "document" }))
        .collect();
    Json(json!({ "object": "list", "data": data })).into_response()
}

async fn upload_file(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record_auth(&state, &headers);
    let name = match extract_filename(&body) {
        Some(name) => name,
        None => return (StatusCode::UNPROCESSABLE_ENTITY, "missing file").into_response(),
    };
    state.upload_bodies.lock().unwrap().push(body.to_vec());

    if state.fail_uploads.lock().unwrap().contains(&name) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable").into_response();
    }
    state.uploads.lock().unwrap().push(name.clone());
    state.existing.lock().unwrap().push(name);
    (StatusCode::CREATED, Json(json!({ "id": "file-1" }))).into_response()
}

async fn search(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_auth(&state, &headers);
    state.search_requests.lock().unwrap().push(body);
    if state.fail_search.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "search backend down").into_response();
    }
    let data: Vec<Value> = state
        .search_chunks
        .lock()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(i, content)| {
            json!({
                "score": 1.0 - (i as f64) * 0.1,
                "chunk": { "id": i, "content": content, "metadata": {} }
            })
        })
        .collect();
    Json(json!({ "object": "list", "data": data })).into_response()
}

async fn chat_completions(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record_auth(&state, &headers);
    let model = body["model"].as_str().unwrap_or_default().to_string();
    state.completion_requests.lock().unwrap().push(body);
    if state.fail_completion.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded").into_response();
    }
    Json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": format!("réponse de {}", model) },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

/// Pull the `filename="..."` of the multipart `file` part out of a raw body.
fn extract_filename(body: &[u8]) -> Option<String> {
    let marker = b"filename=\"";
    let start = find(body, marker)? + marker.len();
    let len = body[start..].iter().position(|&b| b == b'"')?;
    Some(String::from_utf8_lossy(&body[start..start + len]).into_owned())
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
