//! Voice catalogue types shared between the provider client and the HTTP API.

use serde::{Deserialize, Serialize};

/// A voice offered by the text-to-speech provider.
///
/// Only the fields the client needs to pick a voice are kept; everything else
/// the provider returns is dropped at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Provider-assigned voice identifier, used when synthesizing.
    pub voice_id: String,
    /// Human-readable display name.
    pub name: String,
}
