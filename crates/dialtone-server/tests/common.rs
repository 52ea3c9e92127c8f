#![allow(dead_code)]

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use dialtone_db::{open_database, DbPool, DbRuntimeSettings};
use dialtone_server::{app, config::SimulationConfig, AppState};
use dialtone_voice::{ElevenLabsClient, ElevenLabsConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const API_KEY: &str = "voicecall";
pub const PROVIDER_KEY: &str = "sk-test";
pub const FAKE_MP3: &[u8] = b"ID3\x04\x00fake-mp3-bytes";

/// Step interval used by test servers so a whole call takes a fraction of a second.
pub const STEP_INTERVAL_MS: u64 = 40;

/// A running server with an on-disk database and its own static directory.
pub struct TestServer {
    pub url: String,
    pub pool: DbPool,
    pub static_dir: TempDir,
    _db_dir: TempDir,
}

impl TestServer {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    pub fn ws_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url.replacen("http://", "ws://", 1), path)
    }
}

/// Starts the full router on `127.0.0.1:0` with no voice provider key.
pub async fn spawn_server() -> TestServer {
    spawn_server_with_voice(ElevenLabsConfig::default()).await
}

pub async fn spawn_server_with_voice(voice: ElevenLabsConfig) -> TestServer {
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("calls.db");
    let pool = open_database(db_path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    let static_dir = tempfile::tempdir().unwrap();

    let simulation = SimulationConfig {
        step_interval_ms: STEP_INTERVAL_MS,
        ..SimulationConfig::default()
    };
    let state = AppState::new(
        pool.clone(),
        ElevenLabsClient::new(voice).unwrap(),
        API_KEY,
        static_dir.path(),
        &simulation,
    );

    let app = app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestServer {
        url: format!("http://{}", addr),
        pool,
        static_dir,
        _db_dir: db_dir,
    }
}

/// Posts `body` to a protected route with the correct API key.
pub async fn post_authorized(server: &TestServer, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.endpoint(path))
        .header("X-API-Key", API_KEY)
        .json(&body)
        .send()
        .await
        .unwrap()
}

pub async fn call_logs(server: &TestServer) -> Vec<Value> {
    let response = reqwest::get(server.endpoint("/call_logs")).await.unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

/// Polls `/call_logs` until `call_id` has `count` entries, then returns them
/// oldest first.
pub async fn wait_for_entries(server: &TestServer, call_id: &str, count: usize) -> Vec<Value> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let mut entries: Vec<Value> = call_logs(server)
            .await
            .into_iter()
            .filter(|entry| entry["call_id"] == call_id)
            .collect();
        if entries.len() >= count {
            entries.reverse();
            return entries;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {count} entries for {call_id}, have {}",
            entries.len()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Total rows in `call_logs`, read straight from the database.
pub fn row_count(server: &TestServer) -> i64 {
    let conn = server.pool.get().unwrap();
    conn.query_row("SELECT COUNT(*) FROM call_logs", [], |row| row.get(0))
        .unwrap()
}

fn provider_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("xi-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == PROVIDER_KEY)
}

async fn fake_voices(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !provider_authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "voices": [
            { "voice_id": "21m00Tcm4TlvDq8ikWAM", "name": "Rachel", "category": "premade" },
            { "voice_id": "AZnzlk1XvdvUeBnXmlld", "name": "Domi" }
        ]
    })))
}

async fn fake_synthesize(
    Path(_voice_id): Path<String>,
    headers: HeaderMap,
) -> Result<Vec<u8>, (StatusCode, &'static str)> {
    if !provider_authorized(&headers) {
        return Err((StatusCode::UNAUTHORIZED, "invalid_api_key"));
    }
    Ok(FAKE_MP3.to_vec())
}

/// Starts a stand-in for the ElevenLabs API and returns its base URL.
pub async fn start_fake_provider() -> String {
    let app = Router::new()
        .route("/v1/voices", get(fake_voices))
        .route("/v1/text-to-speech/{voice_id}", post(fake_synthesize));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn provider_config(base_url: String, api_key: Option<&str>) -> ElevenLabsConfig {
    ElevenLabsConfig {
        api_key: api_key.map(str::to_string),
        base_url,
        ..ElevenLabsConfig::default()
    }
}
