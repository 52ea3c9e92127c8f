//! Shared types for the Dialtone call simulator.
//!
//! This crate holds the small vocabulary every other Dialtone crate speaks:
//! the fixed set of simulated call statuses, the real-time status event that
//! is fanned out to observers, and the voice summary returned by the
//! text-to-speech provider.
//!
//! It has no I/O and no dependencies beyond `serde` and `thiserror`, so the
//! storage, simulation, voice and server crates can all depend on it without
//! pulling each other in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod voice;

pub use voice::Voice;

/// Progress states of a simulated call.
///
/// A simulated call visits every state exactly once, in declaration order.
/// The serialized form is the human-readable label that is stored in the
/// call log and pushed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    /// The call is being set up.
    #[serde(rename = "Connecting...")]
    Connecting,
    /// The far end is ringing.
    #[serde(rename = "Ringing...")]
    Ringing,
    /// The call was answered and audio is playing.
    #[serde(rename = "In Progress...")]
    InProgress,
    /// The call is over. Terminal.
    #[serde(rename = "Call ended.")]
    Ended,
}

impl CallStatus {
    /// Every status in the order a call visits them.
    pub const SEQUENCE: [CallStatus; 4] = [
        CallStatus::Connecting,
        CallStatus::Ringing,
        CallStatus::InProgress,
        CallStatus::Ended,
    ];

    /// Returns the label stored in the call log and sent to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Ringing => "Ringing...",
            Self::InProgress => "In Progress...",
            Self::Ended => "Call ended.",
        }
    }

    /// Returns the status that follows this one, or `None` for the terminal
    /// status.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Connecting => Some(Self::Ringing),
            Self::Ringing => Some(Self::InProgress),
            Self::InProgress => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Whether the call stops here.
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CallStatus {
    type Err = ParseCallStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SEQUENCE
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseCallStatusError(s.to_string()))
    }
}

/// Error returned when a stored or received label is not a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown call status: {0:?}")]
pub struct ParseCallStatusError(pub String);

/// Real-time notification that a call moved to a new status.
///
/// This is the `call_status` event pushed to every connected observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStatusEvent {
    /// Caller-supplied identifier of the call.
    pub call_id: String,
    /// The status the call just entered.
    pub status: CallStatus,
}

impl CallStatusEvent {
    /// Event name used on the real-time channels.
    pub const EVENT_NAME: &'static str = "call_status";

    pub fn new(call_id: impl Into<String>, status: CallStatus) -> Self {
        Self {
            call_id: call_id.into(),
            status,
        }
    }
}
