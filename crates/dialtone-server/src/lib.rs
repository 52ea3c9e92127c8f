//! Dialtone server library logic.

pub mod api;
pub mod api_calls;
pub mod api_sse;
pub mod api_voice;
pub mod api_ws;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::SimulationConfig;
use dialtone_calls::{CallEventBus, CallLogStore, CallSimulator};
use dialtone_db::DbPool;
use dialtone_voice::ElevenLabsClient;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Append-only call log.
    pub call_log: CallLogStore,
    /// Live call status fan-out, shared with the simulator.
    pub events: CallEventBus,
    /// Runs placed calls on detached tasks.
    pub simulator: CallSimulator,
    /// Text-to-speech provider client.
    pub voice: ElevenLabsClient,
    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: String,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Wires the call log, bus and simulator around one database pool.
    pub fn new(
        pool: DbPool,
        voice: ElevenLabsClient,
        api_key: impl Into<String>,
        static_dir: impl Into<PathBuf>,
        simulation: &SimulationConfig,
    ) -> Self {
        let call_log = CallLogStore::new(pool);
        let events = CallEventBus::new(simulation.channel_capacity);
        let simulator = CallSimulator::new(call_log.clone(), events.clone())
            .with_step_interval(simulation.step_interval())
            .with_failure_policy(simulation.failure_policy());

        Self {
            call_log,
            events,
            simulator,
            voice,
            api_key: api_key.into(),
            static_dir: static_dir.into(),
        }
    }
}

/// Maximum request body size (1 MiB). Text prompts and call requests are small.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/generate_audio",
            post(api_voice::generate_audio_handler),
        )
        .route("/place_call", post(api_calls::place_call_handler))
        .layer(axum::middleware::from_fn(middleware::api_key_middleware));

    let static_dir = state.static_dir.clone();
    if !static_dir.exists() {
        tracing::info!(
            path = %static_dir.display(),
            "static directory not found yet (will be created on first generated clip)"
        );
    }

    Router::new()
        .route("/health", get(health))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/get_voices", get(api_voice::get_voices_handler))
        .route("/call_logs", get(api_calls::call_logs_handler))
        .route("/events/calls", get(api_sse::call_status_stream_handler))
        .route("/ws", get(api_ws::ws_handler))
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
