//! Home Logic Module
//!
//! Everything that lives inside one player's home. Pure in-memory state; no
//! I/O happens below this module.
//!
//! ## Module Structure
//!
//! - `player`: The avatar seam the home reads crowns and arena from
//! - `chest`: Chest entity and unlock progress
//! - `deck`: Active deck, collection, saved presets
//! - `shop`: Shop offer variants
//! - `home`: The aggregate root and its gameplay mutations
//! - `tick`: Tick and fast-forward
//! - `events`: Notable changes produced while advancing time

pub mod player;
pub mod chest;
pub mod deck;
pub mod shop;
pub mod home;
pub mod tick;
pub mod events;

// Re-export key types
pub use player::{Avatar, Player};
pub use chest::{Chest, ChestState};
pub use deck::{
    DeckManager, SavedDeck, Spell, SpellCollection, SpellDeck, EMPTY_CARD, UNAVAILABLE_CARD,
};
pub use shop::{ShopItem, ShopItemBase, ShopItemKind};
pub use home::{ExtensionBlock, Home, EXTENSION_BLOCK_VERSION, PURCHASE_CLAIM_SOURCE};
pub use tick::TickResult;
pub use events::HomeEvent;
