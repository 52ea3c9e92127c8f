//! Call placement and call log handlers.
//!
//! - `POST /place_call`: starts a simulated call and returns at once
//! - `GET /call_logs`: every logged status transition, newest first

use crate::api::{json_body, required, ApiError};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use dialtone_calls::CallLogEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MISSING_CALL_FIELDS: &str = "Missing audio_url or call_id";

/// Request body for `POST /place_call`.
#[derive(Debug, Deserialize)]
pub struct PlaceCallRequest {
    /// Audio to "play" on the call. Echoed back, never fetched.
    pub audio_url: Option<String>,
    /// Caller-chosen identifier grouping the call's log entries.
    pub call_id: Option<String>,
}

/// Acknowledgement returned by `POST /place_call`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceCallResponse {
    pub message: String,
    pub call_id: String,
    pub audio_url: String,
}

/// Handler for `POST /place_call`.
///
/// Validates the request, hands the call to the simulator on a detached
/// task and acknowledges immediately; status updates arrive later over the
/// real-time channels.
pub async fn place_call_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<PlaceCallRequest>, JsonRejection>,
) -> Result<Json<PlaceCallResponse>, ApiError> {
    let request = json_body(body, MISSING_CALL_FIELDS)?;

    let (Some(audio_url), Some(call_id)) = (required(request.audio_url), required(request.call_id))
    else {
        return Err(ApiError::BadRequest(MISSING_CALL_FIELDS.to_string()));
    };

    tracing::info!(call_id = %call_id, audio_url = %audio_url, "placing simulated call");
    state.simulator.spawn(call_id.clone());

    Ok(Json(PlaceCallResponse {
        message: "Call initiated.".to_string(),
        call_id,
        audio_url,
    }))
}

/// Handler for `GET /call_logs`.
pub async fn call_logs_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<CallLogEntry>>, ApiError> {
    let entries = state.call_log.list_all().await.map_err(|e| {
        tracing::error!("failed to read call logs: {}", e);
        ApiError::InternalServerError("Failed to read call logs".to_string())
    })?;
    Ok(Json(entries))
}
