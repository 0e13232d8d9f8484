//! Last-known-authoritative view of a match.
//!
//! One `MatchSnapshot` lives per open battle screen. It is created from
//! the initial handshake payload, mutated only by the battle flow
//! controller, and discarded when the screen unmounts.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardCounter, HAND_CAP};
use crate::ids::CardId;
use crate::stats::{ClassTag, UnitStat};

/// Identity and display metadata for one side. Stable for the whole match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub level: u32,
    pub stat: UnitStat,
    pub class_tag: ClassTag,
}

/// The local player's side: full card data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSide {
    #[serde(flatten)]
    pub profile: Profile,
    pub hp: u32,
    pub max_hp: u32,
    pub hand: Vec<Card>,
    pub card_counter: CardCounter,
    pub true_sight_charges: u32,
}

/// The opponent's side: the hand is known only as a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentSide {
    #[serde(flatten)]
    pub profile: Profile,
    pub hp: u32,
    pub max_hp: u32,
    pub hand_size: usize,
    pub card_counter: CardCounter,
    pub true_sight_charges: u32,
}

impl LocalSide {
    /// Clamp-write HP. The server reports raw subtraction, which can go
    /// below zero on the final blow.
    pub fn set_hp(&mut self, hp: i64) {
        self.hp = clamp_hp(hp, self.max_hp);
    }

    pub fn holds_card(&self, card_id: &CardId) -> bool {
        self.hand.iter().any(|card| &card.id == card_id)
    }

    pub fn find_card(&self, card_id: &CardId) -> Option<&Card> {
        self.hand.iter().find(|card| &card.id == card_id)
    }

    /// The hand size the draw phase must land on: the cap, unless the
    /// deck plus hand cannot fill it.
    pub fn expected_hand_len(&self) -> usize {
        (self.card_counter.total() as usize).min(HAND_CAP)
    }
}

impl OpponentSide {
    pub fn set_hp(&mut self, hp: i64) {
        self.hp = clamp_hp(hp, self.max_hp);
    }
}

pub(crate) fn clamp_hp(hp: i64, max_hp: u32) -> u32 {
    hp.clamp(0, i64::from(max_hp)) as u32
}

/// Both sides of a live match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub local: LocalSide,
    pub opponent: OpponentSide,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardKind;

    fn local_side() -> LocalSide {
        LocalSide {
            profile: Profile {
                name: "hero".to_string(),
                level: 4,
                stat: UnitStat {
                    atk: 10,
                    def: 5,
                    spd: 3,
                    hp: 50,
                },
                class_tag: ClassTag::Mage,
            },
            hp: 50,
            max_hp: 50,
            hand: vec![
                Card::new("c-1", CardKind::Rock),
                Card::new("c-2", CardKind::Paper),
            ],
            card_counter: CardCounter::new(3, 2, 2),
            true_sight_charges: 0,
        }
    }

    #[test]
    fn test_hp_clamps_both_ends() {
        let mut side = local_side();
        side.set_hp(-12);
        assert_eq!(side.hp, 0);
        side.set_hp(9_000);
        assert_eq!(side.hp, 50);
        side.set_hp(37);
        assert_eq!(side.hp, 37);
    }

    #[test]
    fn test_holds_card() {
        let side = local_side();
        assert!(side.holds_card(&CardId::new("c-2")));
        assert!(!side.holds_card(&CardId::new("c-9")));
    }

    #[test]
    fn test_expected_hand_len_caps_at_hand_cap() {
        let mut side = local_side();
        assert_eq!(side.expected_hand_len(), HAND_CAP);
        side.card_counter = CardCounter::new(1, 1, 0);
        assert_eq!(side.expected_hand_len(), 2);
        side.card_counter = CardCounter::default();
        assert_eq!(side.expected_hand_len(), 0);
    }
}
