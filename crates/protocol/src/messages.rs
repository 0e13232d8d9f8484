//! Inbound messages (server → client).
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Removing or renaming variants is a breaking change
//! - Unknown `type` tags deserialize to the `Unknown` variant

use serde::{Deserialize, Serialize};

use clashcard_domain::{CardCounter, LocalSide, OpponentSide, RoundOutcome};

/// First payload of a match: both sides' starting state.
///
/// In poll mode this is the response to the match-start request; in push
/// mode it arrives once the room fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialData {
    pub local: LocalSide,
    pub opponent: OpponentSide,
}

/// Messages from the server to the battle client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Room seat handed out on socket join. Informational only: the
    /// client reads identity from the snapshot, never from the slot.
    #[serde(rename = "slot_assigned")]
    SlotAssigned { slot: String },

    #[serde(rename = "initialData")]
    InitialData(InitialData),

    /// The opponent has locked a card in (or retracted, which the server
    /// never actually does today).
    #[serde(rename = "opponent_choice_status")]
    #[serde(rename_all = "camelCase")]
    OpponentChoiceStatus { opponent_ready: bool },

    #[serde(rename = "round_result")]
    RoundResult(RoundOutcome),

    /// Reply to the caster of true sight: the opponent's hand by type.
    #[serde(rename = "true_sight_result")]
    #[serde(rename_all = "camelCase")]
    TrueSightResult {
        opponent_counter: CardCounter,
        charges_left: u32,
    },

    /// Push to the victim: the opponent just used true sight.
    #[serde(rename = "true_sight_alert")]
    TrueSightAlert,

    #[serde(rename = "opponent_left")]
    OpponentLeft,

    /// Synthesized by the transport when the underlying link drops.
    /// Handled exactly like `opponent_left`: without a reconnect
    /// handshake the client cannot tell the two apart.
    #[serde(rename = "disconnected")]
    Disconnected,

    #[serde(rename = "error")]
    Error { message: String },

    #[serde(other)]
    Unknown,
}
