//! Match phase machine.
//!
//! One explicit enum and one table-driven legality check replace the
//! chained-timeout state juggling the battle screens used to do. The
//! controller is the only caller that actually performs transitions; the
//! table here is what makes an illegal jump detectable instead of silent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::CardId;

/// Where a match currently stands, from the local client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Screen mounted, handshake in flight.
    Connecting,
    /// PvP room not yet full. Solo and campaign matches skip this.
    AwaitingOpponent,
    /// New round; the local player may act.
    AwaitingLocalChoice,
    /// Local card sent; waiting on the opponent (or, in poll mode, the
    /// round response itself).
    LocalChoiceLocked,
    /// Both cards are known to the server; reveal not yet started.
    BothChosen,
    /// Authoritative outcome held; reveal animation running.
    Resolving,
    /// Reveal done; damage text and HP application running.
    ApplyingDamage,
    /// HP applied; draw animation running.
    Drawing,
    /// Terminal. Only navigation leaves this phase.
    MatchEnded,
}

impl MatchPhase {
    pub fn is_terminal(self) -> bool {
        self == MatchPhase::MatchEnded
    }

    /// Whether the machine may move from `self` to `next`.
    ///
    /// `MatchEnded` is reachable from every non-terminal phase because a
    /// forfeit (opponent left, link dropped) or a terminal round outcome
    /// can arrive at any moment; all other edges follow round order.
    pub fn may_advance_to(self, next: MatchPhase) -> bool {
        use MatchPhase::*;

        if next == MatchEnded {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Connecting, AwaitingOpponent)
                // Solo/campaign: initial data arrives with the handshake.
                | (Connecting, AwaitingLocalChoice)
                | (AwaitingOpponent, AwaitingLocalChoice)
                | (AwaitingLocalChoice, LocalChoiceLocked)
                | (LocalChoiceLocked, BothChosen)
                | (BothChosen, Resolving)
                | (Resolving, ApplyingDamage)
                | (ApplyingDamage, Drawing)
                | (Drawing, AwaitingLocalChoice)
        )
    }

    /// Card and true-sight intents are only legal while the player is
    /// actually on the clock.
    pub fn accepts_user_intent(self) -> bool {
        self == MatchPhase::AwaitingLocalChoice
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPhase::Connecting => "connecting",
            MatchPhase::AwaitingOpponent => "awaiting-opponent",
            MatchPhase::AwaitingLocalChoice => "awaiting-local-choice",
            MatchPhase::LocalChoiceLocked => "local-choice-locked",
            MatchPhase::BothChosen => "both-chosen",
            MatchPhase::Resolving => "resolving",
            MatchPhase::ApplyingDamage => "applying-damage",
            MatchPhase::Drawing => "drawing",
            MatchPhase::MatchEnded => "match-ended",
        };
        write!(f, "{name}")
    }
}

/// What the presentation layer may ask the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    PlayCard { card_id: CardId },
    UseTrueSight,
}
