//! Clashcard domain types.
//!
//! Pure vocabulary for the battle client: cards, counters, snapshots,
//! the match phase table, and round outcomes. No I/O and no runtime
//! dependencies live here; the protocol and client crates build on top.

pub mod cards;
pub mod ids;
pub mod outcome;
pub mod phase;
pub mod snapshot;
pub mod stats;

pub use cards::{Card, CardCounter, CardKind, HAND_CAP};
pub use ids::CardId;
pub use outcome::{
    DamageReport, EndDetail, MatchResult, OpponentOutcome, PostGame, RoundOutcome, SideOutcome,
    SpecialEvent, Winner,
};
pub use phase::{MatchPhase, UserIntent};
pub use snapshot::{LocalSide, MatchSnapshot, OpponentSide, Profile};
pub use stats::{ClassTag, UnitStat};
