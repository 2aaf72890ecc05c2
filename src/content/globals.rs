//! Gameplay Globals
//!
//! Tunables shared by every home. Loaded with the catalog; anything missing
//! from the file falls back to the defaults below.

use serde::{Serialize, Deserialize};

/// Global gameplay constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Globals {
    /// Hours between free chests.
    pub free_chest_interval_hours: i32,
    /// Hours the crown chest stays on cooldown after collection.
    pub crown_chest_cooldown_hours: i32,
    /// Crowns needed to fill the crown chest.
    pub crown_chest_crown_count: i32,
    /// Chests allowed to unlock at the same time.
    pub max_chest_opening: usize,
    /// Generic chest slots on a home.
    pub chest_slot_count: usize,
    /// Whether deck presets can be switched.
    pub multiple_decks: bool,
    /// Refresh the player's arena when a home finishes loading.
    pub refresh_arena_in_loading_finished: bool,
    /// Diamond reward rotation for free and crown chests.
    pub free_chest_diamond_loop: Vec<i32>,
    /// Seconds between shop refreshes.
    pub shop_refresh_seconds: i32,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            free_chest_interval_hours: 4,
            crown_chest_cooldown_hours: 24,
            crown_chest_crown_count: 10,
            max_chest_opening: 1,
            chest_slot_count: 4,
            multiple_decks: true,
            refresh_arena_in_loading_finished: true,
            free_chest_diamond_loop: vec![1, 0, 0, 2],
            shop_refresh_seconds: 86_400,
        }
    }
}

impl Globals {
    /// Free chest interval in seconds.
    #[inline]
    pub fn free_chest_interval_seconds(&self) -> i32 {
        3600 * self.free_chest_interval_hours
    }

    /// Crown chest cooldown in seconds.
    #[inline]
    pub fn crown_chest_cooldown_seconds(&self) -> i32 {
        3600 * self.crown_chest_cooldown_hours
    }
}
