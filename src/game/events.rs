//! Home Events
//!
//! Notable state changes produced while a home advances time. Events are not
//! persisted; the session layer logs them and forwards them to the client.

use serde::{Serialize, Deserialize};

use crate::content::GlobalId;

/// Something the player should hear about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeEvent {
    /// A free chest appeared in the free slot.
    FreeChestCreated {
        /// Chest definition.
        chest: GlobalId,
        /// Running chest id at creation.
        sequence: i32,
    },

    /// Enough crowns were collected and the crown chest is ready.
    CrownChestReady {
        /// Chest definition.
        chest: GlobalId,
    },

    /// A chest in a generic slot finished unlocking.
    ChestUnlocked {
        /// Slot index.
        slot: usize,
    },

    /// The crown chest cooldown ended.
    CrownCooldownFinished,

    /// The shop timer ran out.
    ShopRefreshDue,
}

impl HomeEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            HomeEvent::FreeChestCreated { .. } => "free_chest_created",
            HomeEvent::CrownChestReady { .. } => "crown_chest_ready",
            HomeEvent::ChestUnlocked { .. } => "chest_unlocked",
            HomeEvent::CrownCooldownFinished => "crown_cooldown_finished",
            HomeEvent::ShopRefreshDue => "shop_refresh_due",
        }
    }
}
