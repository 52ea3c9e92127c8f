use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_timeout_secs() -> u64 {
    30
}

/// Settings for the ElevenLabs client (`[elevenlabs]` in `config.toml`).
#[derive(Clone, Serialize, Deserialize)]
pub struct ElevenLabsConfig {
    /// Account API key, sent as `xi-api-key`. `None` disables the client.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Scheme and host of the API, without the `/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Synthesis model requested for every clip.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model_id: default_model_id(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("stability", &self.stability)
            .field("similarity_boost", &self.similarity_boost)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ElevenLabsConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// The configured key, treating an empty string as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}
