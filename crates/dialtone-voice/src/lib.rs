//! Text-to-speech provider client for Dialtone.
//!
//! A thin pass-through to the ElevenLabs HTTP API: list the account's voices
//! and synthesize speech for a given voice. Responses are returned as-is
//! (audio bytes are not decoded or transcoded) and there is no retry,
//! caching or rate-limit handling.
//!
//! The API key is optional at construction time so the server can start
//! without one; every call then fails with [`VoiceError::MissingApiKey`]
//! before any network traffic.

pub mod config;
pub mod error;
pub mod tts;

pub use config::{ElevenLabsConfig, DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
pub use error::VoiceError;
pub use tts::ElevenLabsClient;
