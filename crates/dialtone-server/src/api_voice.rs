//! Text-to-speech handlers.
//!
//! - `GET /get_voices`: the provider's voice catalogue
//! - `POST /generate_audio`: synthesize a clip into the static directory
//!
//! Provider failures are logged in full and answered with a generic 500;
//! the upstream detail never reaches the client.

use crate::api::{json_body, required, ApiError};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use dialtone_types::Voice;
use dialtone_voice::VoiceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MISSING_AUDIO_FIELDS: &str = "Missing text or voice ID";
const KEY_NOT_CONFIGURED: &str = "ElevenLabs API key not configured";

/// Request body for `POST /generate_audio`.
#[derive(Debug, Deserialize)]
pub struct GenerateAudioRequest {
    pub text: Option<String>,
    pub voice_id: Option<String>,
}

/// Response body for `POST /generate_audio`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateAudioResponse {
    /// Path under `/static` where the clip can be fetched.
    pub audio_url: String,
}

/// Voice IDs become file names, so only plain tokens are accepted.
fn is_safe_voice_id(voice_id: &str) -> bool {
    voice_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn provider_error(err: VoiceError, generic: &str) -> ApiError {
    if err.is_configuration() {
        tracing::error!("voice provider is not configured: {}", err);
        return ApiError::InternalServerError(KEY_NOT_CONFIGURED.to_string());
    }
    tracing::error!("ElevenLabs API error: {}", err);
    ApiError::InternalServerError(generic.to_string())
}

/// Handler for `GET /get_voices`.
pub async fn get_voices_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Voice>>, ApiError> {
    let voices = state
        .voice
        .list_voices()
        .await
        .map_err(|e| provider_error(e, "Failed to fetch voices. Check your API key."))?;
    Ok(Json(voices))
}

/// Handler for `POST /generate_audio`.
///
/// Writes the clip to `{static_dir}/{voice_id}.mp3`, replacing any earlier
/// clip for the same voice.
pub async fn generate_audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<GenerateAudioRequest>, JsonRejection>,
) -> Result<Json<GenerateAudioResponse>, ApiError> {
    let request = json_body(body, MISSING_AUDIO_FIELDS)?;

    let (Some(text), Some(voice_id)) = (required(request.text), required(request.voice_id)) else {
        return Err(ApiError::BadRequest(MISSING_AUDIO_FIELDS.to_string()));
    };

    if !is_safe_voice_id(&voice_id) {
        return Err(ApiError::BadRequest(format!("Invalid voice ID: {voice_id}")));
    }

    if !state.voice.is_configured() {
        return Err(ApiError::InternalServerError(KEY_NOT_CONFIGURED.to_string()));
    }

    let audio = state.voice.synthesize(&text, &voice_id).await.map_err(|e| {
        provider_error(e, "Failed to generate audio. Check your API key or input.")
    })?;

    let file_name = format!("{voice_id}.mp3");
    let path = state.static_dir.join(&file_name);
    tokio::fs::create_dir_all(&state.static_dir)
        .await
        .map_err(|e| {
            tracing::error!(dir = %state.static_dir.display(), "failed to create static directory: {}", e);
            ApiError::InternalServerError("Failed to save generated audio".to_string())
        })?;
    tokio::fs::write(&path, &audio).await.map_err(|e| {
        tracing::error!(path = %path.display(), "failed to write generated audio: {}", e);
        ApiError::InternalServerError("Failed to save generated audio".to_string())
    })?;

    tracing::info!(voice_id = %voice_id, bytes = audio.len(), "generated audio clip");

    Ok(Json(GenerateAudioResponse {
        audio_url: format!("/static/{file_name}"),
    }))
}
