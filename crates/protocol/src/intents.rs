//! Outbound messages (client → server).

use serde::{Deserialize, Serialize};

use clashcard_domain::CardId;

/// User intents the client transmits.
///
/// `PlayCard` is the round action; `UseTrueSight` is out-of-band and does
/// not consume the turn. The controller gates both before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IntentMessage {
    #[serde(rename_all = "camelCase")]
    PlayCard { card_id: CardId },
    UseTrueSight,
}
