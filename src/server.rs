//! Chat proxy HTTP server.
//!
//! Fronts the AlbertAPI for chat UIs: clients post a conversation, the
//! proxy runs it through the plain or retrieval-augmented pipeline and
//! returns the reply. Requests share nothing but the HTTP client and the
//! configuration.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Welcome message |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/chat/completions` | `{messages}` → `{reply}` |
//! | `POST` | `/rag/albert-source-code/` | `{messages}` → `{reply}`, augmented with the collection |
//!
//! # Error Contract
//!
//! ```json
//! { "detail": "Erreur lors de l'appel à l'API Albert : <cause>" }
//! ```
//!
//! Every pipeline failure, an empty conversation included, is `500`. A body
//! that does not decode as `{messages}` keeps axum's rejection status
//! (`400`, `415` or `422`) but uses the same `{detail}` shape.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::client::AlbertClient;
use crate::config::Config;
use crate::error::AlbertError;
use crate::models::Message;
use crate::rag;

pub const RAG_ROUTE: &str = "/rag/albert-source-code/";
pub const WELCOME: &str = "Bienvenue sur l'API pour interroger AlbertAPI !";
const UPSTREAM_ERROR_PREFIX: &str = "Erreur lors de l'appel à l'API Albert : ";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<AlbertClient>,
}

impl AppState {
    pub fn new(config: Config, client: AlbertClient) -> Self {
        Self {
            config: Arc::new(config),
            client: Arc::new(client),
        }
    }
}

/// Build the proxy router. Exposed separately so tests can serve it on an
/// ephemeral port.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/chat/completions", post(handle_chat))
        .route(RAG_ROUTE, post(handle_rag))
        .layer(cors)
        .with_state(state)
}

/// Bind `server.bind` and serve until the process is terminated.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let client = AlbertClient::new(&config.api)?;
    let bind_addr = config.server.bind.clone();
    info!(upstream = client.base_url(), "chat proxy configured");

    let app = router(AppState::new(config, client));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("Chat proxy listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Handler-boundary error: every pipeline failure becomes one of these.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    detail: String,
}

impl From<AlbertError> for AppError {
    fn from(err: AlbertError) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("{}{}", UPSTREAM_ERROR_PREFIX, err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

// ============ GET / and /health ============

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

async fn handle_root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse { message: WELCOME })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ POST /chat/completions and /rag/... ============

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = payload?;
    info!(messages = request.messages.len(), "chat request");
    let reply = rag::chat(&state.client, &state.config.models, &request.messages)
        .await
        .map_err(|e| {
            error!(error = %e, "chat failed");
            AppError::from(e)
        })?;
    Ok(Json(ChatReply { reply }))
}

async fn handle_rag(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = payload?;
    info!(messages = request.messages.len(), "rag request");
    let reply = rag::rag_chat(
        &state.client,
        &state.config.models,
        &state.config.retrieval,
        &request.messages,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "rag chat failed");
        AppError::from(e)
    })?;
    Ok(Json(ChatReply { reply }))
}
