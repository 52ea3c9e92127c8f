use crate::config::ElevenLabsConfig;
use crate::error::VoiceError;
use dialtone_types::Voice;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of upstream error-body bytes kept for logging.
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Header carrying the account key on every ElevenLabs request.
const API_KEY_HEADER: &str = "xi-api-key";

/// Client for the ElevenLabs voice catalogue and synthesis endpoints.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    http: reqwest::Client,
    config: ElevenLabsConfig,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<Voice>,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabsClient {
    /// Builds a client with its own connection pool and request timeout.
    pub fn new(config: ElevenLabsConfig) -> Result<Self, VoiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("dialtone/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.config.api_key().is_some()
    }

    pub fn config(&self) -> &ElevenLabsConfig {
        &self.config
    }

    /// Lists the voices available to the configured account.
    pub async fn list_voices(&self) -> Result<Vec<Voice>, VoiceError> {
        let api_key = self.api_key()?;
        let url = self.url("/v1/voices");

        tracing::debug!(%url, "fetching voice catalogue");
        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;

        let body: VoicesResponse = resp
            .json()
            .await
            .map_err(|e| VoiceError::Decode(e.to_string()))?;
        Ok(body.voices)
    }

    /// Synthesizes `text` with `voice_id` and returns the encoded audio
    /// (MP3 by provider default) untouched.
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, VoiceError> {
        let api_key = self.api_key()?;
        let url = self.url(&format!("/v1/text-to-speech/{voice_id}"));
        let request = SynthesisRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        tracing::debug!(voice_id, chars = text.chars().count(), "requesting speech synthesis");
        let resp = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;

        let audio = resp.bytes().await?;
        Ok(audio.to_vec())
    }

    fn api_key(&self) -> Result<&str, VoiceError> {
        self.config.api_key().ok_or(VoiceError::MissingApiKey)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, VoiceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let mut body = resp.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY_BYTES {
            let mut cut = MAX_ERROR_BODY_BYTES;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(VoiceError::UpstreamStatus { status, body })
    }
}
