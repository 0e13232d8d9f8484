//! Authoritative round and match results.
//!
//! Everything in here is server-computed. The client overwrites its
//! snapshot from these payloads and never recomputes any of it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cards::{Card, CardCounter};
use crate::stats::UnitStat;

/// Who took the round (or the match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Local,
    Opponent,
    Draw,
}

/// Class passive that fired during the round, if any. Drives which attack
/// animation and sound the presentation layer picks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialEvent {
    #[serde(rename = "Warrior Blood")]
    WarriorBlood,
    #[serde(rename = "True Strike")]
    TrueStrike,
    #[serde(rename = "True Sight")]
    TrueSight,
    #[default]
    #[serde(rename = "nothing")]
    Nothing,
}

/// Damage a side dealt this round.
///
/// The wire encoding is a bare integer: `-1` means the hit was evaded,
/// `0` means nothing to show, positive is the damage number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DamageReport {
    Evaded,
    #[default]
    None,
    Hit(u32),
}

impl DamageReport {
    pub fn from_wire(value: i64) -> Self {
        match value {
            v if v < 0 => DamageReport::Evaded,
            0 => DamageReport::None,
            v => DamageReport::Hit(u32::try_from(v).unwrap_or(u32::MAX)),
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            DamageReport::Evaded => -1,
            DamageReport::None => 0,
            DamageReport::Hit(v) => i64::from(v),
        }
    }
}

impl Serialize for DamageReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for DamageReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Ok(DamageReport::from_wire(value))
    }
}

/// The local side of a round result: full hand contents.
///
/// `hp` stays signed here because the server reports raw subtraction;
/// the snapshot store clamps it into `[0, max_hp]` on application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideOutcome {
    pub hp: i64,
    pub hand: Vec<Card>,
    pub card_played: Card,
    pub damage_dealt: DamageReport,
    pub card_counter: CardCounter,
    pub true_sight_charges: u32,
    #[serde(default)]
    pub special_event: SpecialEvent,
}

/// The opponent side of a round result: hand as a length only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentOutcome {
    pub hp: i64,
    pub hand_size: usize,
    pub card_played: Card,
    pub damage_dealt: DamageReport,
    pub card_counter: CardCounter,
    pub true_sight_charges: u32,
    #[serde(default)]
    pub special_event: SpecialEvent,
}

/// Match result from the local player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Win,
    Lose,
    Draw,
}

/// Why the match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndDetail {
    #[serde(rename = "You out of HP")]
    LocalOutOfHp,
    #[serde(rename = "You out of Card")]
    LocalOutOfCards,
    #[serde(rename = "Opponent out of HP")]
    OpponentOutOfHp,
    #[serde(rename = "Opponent out of Card")]
    OpponentOutOfCards,
    #[serde(rename = "Opponent leave")]
    OpponentLeft,
    #[serde(rename = "Both out of HP")]
    BothOutOfHp,
    #[serde(rename = "Both out of Card")]
    BothOutOfCards,
}

/// Postgame summary shown on the end screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGame {
    pub result: MatchResult,
    pub detail: EndDetail,
    pub reward_exp: u32,
    pub reward_gold: u32,
    pub level_up: u32,
    pub stat_gain: UnitStat,
}

impl PostGame {
    /// The summary the client synthesizes when the opponent leaves or the
    /// link drops: a win by forfeit with no rewards. The two cases are not
    /// distinguishable without a reconnect handshake, so both land here.
    pub fn forfeit_win() -> Self {
        Self {
            result: MatchResult::Win,
            detail: EndDetail::OpponentLeft,
            reward_exp: 0,
            reward_gold: 0,
            level_up: 0,
            stat_gain: UnitStat::default(),
        }
    }
}

/// One resolved round, as the server tells it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub terminal: bool,
    pub winner: Winner,
    pub local: SideOutcome,
    pub opponent: OpponentOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_game: Option<PostGame>,
}
