//! Content Registry
//!
//! The static catalog (cards, chests, arenas, resources, globals) that home
//! logic looks definitions up in. A registry is built once at startup, shared
//! behind an `Arc`, and passed by reference to every operation that needs a
//! lookup. Dropping the last reference tears it down.

pub mod data;
pub mod globals;

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;

pub use data::{
    GlobalId, CardData, ChestData, ArenaData, ResourceData, Rarity,
    CLASS_RESOURCE, CLASS_CHEST, CLASS_CHARACTER, CLASS_BUILDING, CLASS_SPELL, CLASS_ARENA,
    CARD_CLASSES,
};
pub use globals::Globals;

/// Catalog bundled with the crate, used by the demo binary and tests.
pub const BUNDLED_CONTENT: &str = include_str!("../../data/content.json");

/// Errors raised while building a registry.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Catalog file could not be read.
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog JSON is malformed.
    #[error("invalid content json: {0}")]
    Json(#[from] serde_json::Error),

    /// Two rows share an id.
    #[error("duplicate {table} id {id}")]
    DuplicateId {
        /// Table name.
        table: &'static str,
        /// Offending id.
        id: GlobalId,
    },

    /// Row id is outside the table's class.
    #[error("{table} id {id} has the wrong class")]
    WrongClass {
        /// Table name.
        table: &'static str,
        /// Offending id.
        id: GlobalId,
    },

    /// Arena references a chest that does not exist.
    #[error("arena {arena} references unknown chest {chest}")]
    UnknownChest {
        /// Arena id.
        arena: GlobalId,
        /// Missing chest id.
        chest: GlobalId,
    },

    /// Catalog has no arenas.
    #[error("content has no arenas")]
    NoArenas,
}

/// On-disk shape of the catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContentFile {
    /// Card rows.
    #[serde(default)]
    pub cards: Vec<CardData>,
    /// Chest rows.
    #[serde(default)]
    pub chests: Vec<ChestData>,
    /// Arena rows.
    #[serde(default)]
    pub arenas: Vec<ArenaData>,
    /// Resource rows.
    #[serde(default)]
    pub resources: Vec<ResourceData>,
    /// Gameplay globals.
    #[serde(default)]
    pub globals: Globals,
}

/// Immutable content lookup.
#[derive(Clone, Debug)]
pub struct GameContent {
    cards: BTreeMap<GlobalId, CardData>,
    chests: BTreeMap<GlobalId, ChestData>,
    arenas: BTreeMap<GlobalId, ArenaData>,
    resources: BTreeMap<GlobalId, ResourceData>,
    globals: Globals,
    starting_arena: GlobalId,
}

fn index_rows<T>(
    table: &'static str,
    rows: Vec<T>,
    id_of: impl Fn(&T) -> GlobalId,
    class_ok: impl Fn(GlobalId) -> bool,
) -> Result<BTreeMap<GlobalId, T>, ContentError> {
    let mut map = BTreeMap::new();
    for row in rows {
        let id = id_of(&row);
        if !class_ok(id) {
            return Err(ContentError::WrongClass { table, id });
        }
        if map.insert(id, row).is_some() {
            return Err(ContentError::DuplicateId { table, id });
        }
    }
    Ok(map)
}

impl GameContent {
    /// Build a registry from parsed rows.
    pub fn from_file(file: ContentFile) -> Result<Self, ContentError> {
        let cards = index_rows("card", file.cards, |c| c.id, GlobalId::is_card)?;
        let chests = index_rows("chest", file.chests, |c| c.id, |id| id.class_id() == CLASS_CHEST)?;
        let arenas = index_rows("arena", file.arenas, |a| a.id, |id| id.class_id() == CLASS_ARENA)?;
        let resources = index_rows(
            "resource",
            file.resources,
            |r| r.id,
            |id| id.class_id() == CLASS_RESOURCE,
        )?;

        let starting_arena = arenas
            .values()
            .min_by_key(|a| (a.trophy_limit, a.id))
            .map(|a| a.id)
            .ok_or(ContentError::NoArenas)?;

        for arena in arenas.values() {
            for chest in [arena.free_chest, arena.crown_chest] {
                if !chests.contains_key(&chest) {
                    return Err(ContentError::UnknownChest { arena: arena.id, chest });
                }
            }
        }

        Ok(Self {
            cards,
            chests,
            arenas,
            resources,
            globals: file.globals,
            starting_arena,
        })
    }

    /// Parse a JSON catalog.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Self::from_file(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Registry built from the bundled catalog.
    pub fn bundled() -> Result<Self, ContentError> {
        Self::from_json(BUNDLED_CONTENT)
    }

    /// Gameplay globals.
    #[inline]
    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    /// Look up a card.
    pub fn card(&self, id: GlobalId) -> Option<&CardData> {
        self.cards.get(&id)
    }

    /// Look up a card by the raw id stored in a saved deck.
    pub fn card_by_raw(&self, raw: i32) -> Option<&CardData> {
        self.card(GlobalId::from_raw(raw))
    }

    /// All cards in id order.
    pub fn cards(&self) -> impl Iterator<Item = &CardData> {
        self.cards.values()
    }

    /// Look up a chest.
    pub fn chest(&self, id: GlobalId) -> Option<&ChestData> {
        self.chests.get(&id)
    }

    /// Look up an arena.
    pub fn arena(&self, id: GlobalId) -> Option<&ArenaData> {
        self.arenas.get(&id)
    }

    /// Look up a resource.
    pub fn resource(&self, id: GlobalId) -> Option<&ResourceData> {
        self.resources.get(&id)
    }

    /// Lowest arena.
    pub fn starting_arena(&self) -> &ArenaData {
        &self.arenas[&self.starting_arena]
    }

    /// Highest arena whose trophy limit is met.
    pub fn arena_for_trophies(&self, trophies: i32) -> &ArenaData {
        self.arenas
            .values()
            .filter(|a| a.trophy_limit <= trophies)
            .max_by_key(|a| (a.trophy_limit, a.id))
            .unwrap_or_else(|| self.starting_arena())
    }
}

#[cfg(test)]
pub(crate) fn test_content() -> GameContent {
    GameContent::bundled().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_content_loads() {
        let content = test_content();
        assert_eq!(content.cards().count(), 16);
        assert!(content.chest(GlobalId::new(CLASS_CHEST, 3)).is_some());
        assert_eq!(content.globals().crown_chest_crown_count, 10);
    }

    #[test]
    fn test_arena_for_trophies() {
        let content = test_content();
        assert_eq!(content.arena_for_trophies(0).name, "Training Camp");
        assert_eq!(content.arena_for_trophies(450).name, "Goblin Stadium");
        assert_eq!(content.arena_for_trophies(5000).name, "Bone Pit");
        assert_eq!(content.arena_for_trophies(-10).name, "Training Camp");
    }

    #[test]
    fn test_missing_globals_use_defaults() {
        let json = r#"{
            "chests": [{ "id": 19000000, "name": "Free" }],
            "arenas": [{
                "id": 54000000, "name": "A",
                "free_chest": 19000000, "crown_chest": 19000000
            }],
            "globals": { "crown_chest_crown_count": 3 }
        }"#;
        let content = GameContent::from_json(json).unwrap();
        assert_eq!(content.globals().crown_chest_crown_count, 3);
        assert_eq!(content.globals().free_chest_interval_hours, 4);
    }

    #[test]
    fn test_duplicate_card_rejected() {
        let json = r#"{
            "cards": [
                { "id": 26000000, "name": "A", "rarity": "common" },
                { "id": 26000000, "name": "B", "rarity": "rare" }
            ],
            "chests": [{ "id": 19000000, "name": "Free" }],
            "arenas": [{
                "id": 54000000, "name": "A",
                "free_chest": 19000000, "crown_chest": 19000000
            }]
        }"#;
        assert!(matches!(
            GameContent::from_json(json),
            Err(ContentError::DuplicateId { table: "card", .. })
        ));
    }

    #[test]
    fn test_wrong_class_rejected() {
        let json = r#"{
            "chests": [{ "id": 26000000, "name": "Knight" }],
            "arenas": []
        }"#;
        assert!(matches!(
            GameContent::from_json(json),
            Err(ContentError::WrongClass { table: "chest", .. })
        ));
    }

    #[test]
    fn test_unknown_arena_chest_rejected() {
        let json = r#"{
            "chests": [{ "id": 19000000, "name": "Free" }],
            "arenas": [{
                "id": 54000000, "name": "A",
                "free_chest": 19000000, "crown_chest": 19000009
            }]
        }"#;
        assert!(matches!(
            GameContent::from_json(json),
            Err(ContentError::UnknownChest { .. })
        ));
    }

    #[test]
    fn test_no_arenas_rejected() {
        assert!(matches!(
            GameContent::from_json("{}"),
            Err(ContentError::NoArenas)
        ));
    }
}
