//! Wire contract shared between the battle client and the server.
//!
//! The payload shapes here are a shared kernel: they must match what the
//! server emits byte for byte, so they live in their own crate rather than
//! being redefined per screen. Domain vocabulary types (cards, counters,
//! outcomes) are reused directly instead of being mirrored.

pub mod intents;
pub mod messages;

pub use intents::IntentMessage;
pub use messages::{InitialData, ServerMessage};

use thiserror::Error;

/// Failure to decode an inbound frame.
#[derive(Debug, Error)]
#[error("Malformed server message: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Parse one inbound text frame.
///
/// Unknown `type` tags decode to [`ServerMessage::Unknown`] so that new
/// server pushes never break an older client; callers log and skip those.
pub fn parse_server_message(text: &str) -> Result<ServerMessage, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode one outbound intent as a text frame.
pub fn encode_intent(intent: &IntentMessage) -> Result<String, DecodeError> {
    Ok(serde_json::to_string(intent)?)
}
