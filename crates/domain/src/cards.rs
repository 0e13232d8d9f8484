//! Cards and per-type deck counters.

use serde::{Deserialize, Serialize};

use crate::ids::CardId;

/// Maximum hand size. The server refills each side back up to this after
/// every round while its deck still has cards.
pub const HAND_CAP: usize = 3;

/// The playable card types, plus `Concealed` for opponent cards whose
/// kind the server has not revealed.
///
/// `Concealed` is never turned into a real kind locally; only an explicit
/// reveal (the round result, or a true-sight response) carries real kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Rock,
    Paper,
    Scissors,
    Concealed,
}

impl CardKind {
    pub fn is_concealed(self) -> bool {
        self == CardKind::Concealed
    }
}

/// A single card as the client knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    #[serde(rename = "type")]
    pub kind: CardKind,
}

impl Card {
    pub fn new(id: impl Into<CardId>, kind: CardKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Placeholder for an opponent card on the board before the reveal.
    pub fn concealed(id: impl Into<CardId>) -> Self {
        Self::new(id, CardKind::Concealed)
    }
}

/// Remaining draws of each type in a side's deck plus hand.
///
/// The counter only ever shrinks, or is replaced wholesale by an
/// authoritative payload. The client never increments it on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCounter {
    pub rock: u32,
    pub paper: u32,
    pub scissors: u32,
}

impl CardCounter {
    pub fn new(rock: u32, paper: u32, scissors: u32) -> Self {
        Self {
            rock,
            paper,
            scissors,
        }
    }

    pub fn total(&self) -> u32 {
        self.rock + self.paper + self.scissors
    }

    pub fn is_exhausted(&self) -> bool {
        self.total() == 0
    }

    pub fn of(&self, kind: CardKind) -> Option<u32> {
        match kind {
            CardKind::Rock => Some(self.rock),
            CardKind::Paper => Some(self.paper),
            CardKind::Scissors => Some(self.scissors),
            CardKind::Concealed => None,
        }
    }
}
