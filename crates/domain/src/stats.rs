//! Combat stats and class metadata.
//!
//! These are display data as far as the client is concerned: the server
//! owns the damage formula and the class passives, the client only renders
//! their results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStat {
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
    pub hp: u32,
}

/// Character class. Determines which passive the server applies
/// (Warrior's Blood, True Sight, True Strike).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassTag {
    Warrior,
    Mage,
    Assassin,
    #[default]
    None,
}
