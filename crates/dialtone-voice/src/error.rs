use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    /// No provider API key is configured.
    #[error("ElevenLabs API key not configured")]
    MissingApiKey,

    #[error("ElevenLabs request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("ElevenLabs returned {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid ElevenLabs response: {0}")]
    Decode(String),

    #[error("invalid voice client configuration: {0}")]
    Config(String),
}

impl VoiceError {
    /// Whether the failure is on our side (configuration) rather than the
    /// provider's.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::Config(_))
    }
}
