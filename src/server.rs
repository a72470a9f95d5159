//! HTTP API for the chat front-end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/content` | Ingest a document `{id, text, metadata?}` |
//! | `POST` | `/query` | Answer a question `{text, context?, k?}` |
//! | `GET`  | `/content/{id}` | Fetch a stored document |
//! | `GET`  | `/stats` | Store size, dimensionality, and models |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `conflict` (409),
//! `upstream` (502), `internal` (500). Malformed or incomplete JSON bodies
//! are `bad_request` as well.
//!
//! # CORS
//!
//! Origins come from `server.allowed_origins`; `"*"` permits any origin.
//! All methods and headers are permitted.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ragchat_core::{ChatEngine, ChatResponse, Document, ErrorKind, Metadata, RagError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

use crate::config::{Config, ServerConfig};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    engine: Arc<ChatEngine>,
}

/// Build the router with CORS applied.
pub fn router(engine: Arc<ChatEngine>, config: &ServerConfig) -> Result<Router> {
    let state = AppState { engine };

    Ok(Router::new()
        .route("/content", post(handle_add_content))
        .route("/content/{id}", get(handle_get_content))
        .route("/query", post(handle_query))
        .route("/stats", get(handle_stats))
        .route("/health", get(handle_health))
        .layer(cors_layer(&config.allowed_origins)?)
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Starts the HTTP server on `config.server.bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config, engine: Arc<ChatEngine>) -> Result<()> {
    let app = router(engine, &config.server)?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!(addr = %listener.local_addr()?, "ragchat server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        let (status, code) = match err.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "bad_request"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ErrorKind::Upstream => {
                warn!(error = %err, "upstream provider failed");
                (StatusCode::BAD_GATEWAY, "upstream")
            }
            ErrorKind::Internal => {
                error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: rejection.body_text(),
        }
    }
}

// ============ POST /content ============

#[derive(Deserialize)]
struct ContentRequest {
    id: String,
    text: String,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Serialize)]
struct ContentResponse {
    status: &'static str,
    message: &'static str,
    id: String,
    position: usize,
}

async fn handle_add_content(
    State(state): State<AppState>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<Json<ContentResponse>, AppError> {
    let Json(req) = payload?;
    let doc = state
        .engine
        .pipeline()
        .ingest(&req.id, &req.text, req.metadata)
        .await?;

    Ok(Json(ContentResponse {
        status: "success",
        message: "Content added successfully",
        id: doc.id,
        position: doc.position,
    }))
}

// ============ GET /content/{id} ============

async fn handle_get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    Ok(Json(state.engine.pipeline().get(&id)?))
}

// ============ POST /query ============

#[derive(Deserialize)]
struct QueryRequest {
    text: String,
    /// Earlier conversation turns supplied by the client.
    #[serde(default)]
    context: Option<Vec<String>>,
    /// Overrides `retrieval.top_k` for this request.
    #[serde(default)]
    k: Option<usize>,
}

async fn handle_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let resp = state
        .engine
        .answer(&req.text, req.context.as_deref(), req.k)
        .await?;
    Ok(Json(resp))
}

// ============ GET /stats ============

#[derive(Serialize)]
struct StatsResponse {
    documents: usize,
    vectors: usize,
    dims: usize,
    capacity: usize,
    embedding_model: String,
    generation_model: String,
    top_k: usize,
}

async fn handle_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.engine.pipeline().stats();
    Json(StatsResponse {
        documents: stats.documents,
        vectors: stats.vectors,
        dims: stats.dims,
        capacity: stats.capacity,
        embedding_model: stats.embedding_model,
        generation_model: state.engine.generator().model_name().to_string(),
        top_k: state.engine.top_k(),
    })
}

// ============ GET /health ============

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
