//! digest-api - HTTP API server for diff-digest
//!
//! Serves the merged-PR diff listing and relays streaming note generation
//! as Server-Sent Events. Thin by design: pagination lives in
//! digest-source, model access in digest-inference, and this binary wires
//! them behind the HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Sse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use digest_core::{defaults, DiffPage, DiffSource, GeneratedNotes, NotesBackend, NotesRequest};
use digest_inference::ResponsesBackend;
use digest_source::GitHubDiffSource;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Server binding configuration from environment.
struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("DIGEST_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults::SERVER_PORT);
        Self { host, port }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

#[derive(Clone)]
struct AppState {
    /// Streaming note generation backend.
    notes: Arc<dyn NotesBackend>,
    /// Merged-PR diff source.
    diffs: Arc<dyn DiffSource>,
}

// =============================================================================
// HEALTH
// =============================================================================

async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.notes.model_name(),
    }))
}

// =============================================================================
// DIFF LISTING
// =============================================================================

#[derive(Debug, Deserialize)]
struct DiffsQuery {
    page: Option<u32>,
    per_page: Option<u32>,
}

/// `GET /diffs?page=<int>&per_page=<int>`
///
/// Returns one page of merged-PR diffs with pagination cursors.
async fn list_diffs(
    State(state): State<AppState>,
    Query(query): Query<DiffsQuery>,
) -> Result<Json<DiffPage>, ApiError> {
    let page = query.page.unwrap_or(defaults::FIRST_PAGE);
    let per_page = query.per_page.unwrap_or(defaults::DIFFS_PER_PAGE);

    let diffs = state
        .diffs
        .fetch_page(page, per_page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch diffs", e))?;

    info!(page, diff_count = diffs.diffs.len(), "Served diff page");
    Ok(Json(diffs))
}

// =============================================================================
// NOTE GENERATION
// =============================================================================

/// `POST /generate-notes`
///
/// Relays model events verbatim as SSE frames
/// `data: {"event": "<type>", "data": <payload>}\n\n`. A mid-stream model
/// failure aborts the response body instead of closing the stream cleanly,
/// so clients can tell interruption from completion.
async fn generate_notes(
    State(state): State<AppState>,
    Json(request): Json<NotesRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, std::io::Error>>>, ApiError> {
    request.validate()?;

    info!(diff_id = %request.id, "Starting note stream");

    let events = state
        .notes
        .stream_notes(&request)
        .await
        .map_err(|e| ApiError::upstream("Failed to generate notes", e))?;

    let stream = events.map(|result| match result {
        Ok(event) => serde_json::to_string(&event)
            .map(|json| Event::default().data(json))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string())),
        Err(e) => {
            warn!(error = %e, "Note stream failed mid-flight, aborting transport");
            Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(defaults::SSE_KEEPALIVE_SECS))
            .text("keepalive"),
    ))
}

/// `POST /generate-notes/sync`
///
/// Non-streaming variant: one JSON body with the final notes.
async fn generate_notes_sync(
    State(state): State<AppState>,
    Json(request): Json<NotesRequest>,
) -> Result<Json<GeneratedNotes>, ApiError> {
    request.validate()?;

    let notes = state
        .notes
        .generate_notes(&request)
        .await
        .map_err(|e| ApiError::upstream("Failed to generate notes", e))?;

    info!(diff_id = %request.id, "Served notes (sync)");
    Ok(Json(notes))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Upstream {
        status: Option<u16>,
        error: String,
        details: String,
    },
    Internal(String),
}

impl ApiError {
    /// Wrap a core error as an operation-level upstream failure, keeping
    /// the upstream status code when one is known.
    fn upstream(context: &str, err: digest_core::Error) -> Self {
        match err {
            digest_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            digest_core::Error::Upstream { status, message } => ApiError::Upstream {
                status,
                error: context.to_string(),
                details: message,
            },
            other => ApiError::Upstream {
                status: None,
                error: context.to_string(),
                details: other.to_string(),
            },
        }
    }
}

impl From<digest_core::Error> for ApiError {
    fn from(err: digest_core::Error) -> Self {
        match err {
            digest_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            digest_core::Error::Upstream { status, message } => ApiError::Upstream {
                status,
                error: "Upstream request failed".to_string(),
                details: message,
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": msg})),
            )
                .into_response(),
            ApiError::Upstream {
                status,
                error,
                details,
            } => {
                let status = status
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (
                    status,
                    Json(serde_json::json!({"error": error, "details": details})),
                )
                    .into_response()
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": msg})),
            )
                .into_response(),
        }
    }
}

// =============================================================================
// ROUTER
// =============================================================================

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/diffs", get(list_diffs))
        .route("/generate-notes", post(generate_notes))
        .route("/generate-notes/sync", post(generate_notes_sync))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// MAIN
// =============================================================================

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   RUST_LOG   - standard env filter (default: "digest_api=debug,tower_http=debug")
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "digest_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received, stopping server");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let config = ServerConfig::from_env();

    let notes: Arc<dyn NotesBackend> = Arc::new(ResponsesBackend::from_env()?);
    let diffs: Arc<dyn DiffSource> = Arc::new(GitHubDiffSource::from_env()?);

    let state = AppState { notes, diffs };
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
