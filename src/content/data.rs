//! Content Definitions
//!
//! Immutable rows of the content catalog. Every row is addressed by a
//! [`GlobalId`] whose millions digit block names the table it lives in.

use std::fmt;
use serde::{Serialize, Deserialize};

// =============================================================================
// GLOBAL ID
// =============================================================================

/// Resource table class.
pub const CLASS_RESOURCE: i32 = 5;
/// Treasure chest table class.
pub const CLASS_CHEST: i32 = 19;
/// Troop card table class.
pub const CLASS_CHARACTER: i32 = 26;
/// Building card table class.
pub const CLASS_BUILDING: i32 = 27;
/// Spell card table class.
pub const CLASS_SPELL: i32 = 28;
/// Arena table class.
pub const CLASS_ARENA: i32 = 54;

/// Card classes, in the order they are listed in the catalog.
pub const CARD_CLASSES: [i32; 3] = [CLASS_CHARACTER, CLASS_BUILDING, CLASS_SPELL];

const CLASS_SCALE: i32 = 1_000_000;

/// Content identifier: `class * 1_000_000 + instance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalId(i32);

impl GlobalId {
    /// Build from class and instance.
    pub const fn new(class_id: i32, instance_id: i32) -> Self {
        Self(class_id * CLASS_SCALE + instance_id)
    }

    /// Build from class and instance read off the wire.
    ///
    /// `None` unless the class is positive, the instance fits inside its
    /// table and the packed id does not overflow.
    pub fn checked_new(class_id: i32, instance_id: i32) -> Option<Self> {
        if class_id <= 0 || !(0..CLASS_SCALE).contains(&instance_id) {
            return None;
        }
        class_id
            .checked_mul(CLASS_SCALE)
            .and_then(|base| base.checked_add(instance_id))
            .map(Self)
    }

    /// Wrap a raw identifier as stored in saved decks.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Table class.
    #[inline]
    pub const fn class_id(self) -> i32 {
        self.0 / CLASS_SCALE
    }

    /// Row index inside the table.
    #[inline]
    pub const fn instance_id(self) -> i32 {
        self.0 % CLASS_SCALE
    }

    /// Whether this id points into one of the card tables.
    pub fn is_card(self) -> bool {
        CARD_CLASSES.contains(&self.class_id())
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class_id(), self.instance_id())
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// Card rarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Common card
    Common,
    /// Rare card
    Rare,
    /// Epic card
    Epic,
    /// Legendary card
    Legendary,
}

/// Card definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    /// Global identifier.
    pub id: GlobalId,
    /// Display name.
    pub name: String,
    /// Rarity tier.
    pub rarity: Rarity,
}

/// Treasure chest definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestData {
    /// Global identifier.
    pub id: GlobalId,
    /// Display name.
    pub name: String,
    /// Seconds needed to unlock once a worker is assigned.
    #[serde(default)]
    pub unlock_seconds: i32,
}

/// Arena definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaData {
    /// Global identifier.
    pub id: GlobalId,
    /// Display name.
    pub name: String,
    /// Trophies needed to enter.
    #[serde(default)]
    pub trophy_limit: i32,
    /// Chest handed out by the free chest timer.
    pub free_chest: GlobalId,
    /// Chest handed out when the crown counter fills up.
    pub crown_chest: GlobalId,
}

/// Resource definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Global identifier.
    pub id: GlobalId,
    /// Display name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_id_parts() {
        let id = GlobalId::new(CLASS_CHEST, 42);
        assert_eq!(id.raw(), 19_000_042);
        assert_eq!(id.class_id(), CLASS_CHEST);
        assert_eq!(id.instance_id(), 42);
        assert_eq!(id.to_string(), "19:42");
    }

    #[test]
    fn test_checked_new_rejects_overflow() {
        assert_eq!(GlobalId::checked_new(CLASS_CHEST, 42), Some(GlobalId::new(CLASS_CHEST, 42)));
        assert_eq!(GlobalId::checked_new(2147, 483_647), Some(GlobalId::from_raw(i32::MAX)));
        assert_eq!(GlobalId::checked_new(2147, 483_648), None);
        assert_eq!(GlobalId::checked_new(5000, 0), None);
        assert_eq!(GlobalId::checked_new(0, 1), None);
        assert_eq!(GlobalId::checked_new(CLASS_CHEST, 1_000_000), None);
    }

    #[test]
    fn test_card_classes() {
        assert!(GlobalId::new(CLASS_CHARACTER, 1).is_card());
        assert!(GlobalId::new(CLASS_SPELL, 0).is_card());
        assert!(!GlobalId::new(CLASS_ARENA, 0).is_card());
        assert!(!GlobalId::from_raw(-1).is_card());
    }
}
