//! Player Link
//!
//! The home reads and writes a handful of values on the player (avatar)
//! entity it belongs to. The [`Avatar`] trait is that seam; [`Player`] is the
//! in-crate implementation used by the session actor and tests.

use serde::{Serialize, Deserialize};

use crate::content::{GameContent, GlobalId};

/// Values a home exchanges with its player.
pub trait Avatar {
    /// Crowns won since the home last pulled them.
    fn star_count(&self) -> i32;

    /// Overwrite the pending crown count.
    fn set_star_count(&mut self, count: i32);

    /// Arena the player currently plays in.
    fn arena(&self) -> GlobalId;

    /// Recompute the arena from player progress.
    fn refresh_arena(&mut self, content: &GameContent);

    /// Publish the number of cards found.
    fn set_cards_found(&mut self, count: i32);

    /// Publish the number of chests held.
    fn set_chest_count(&mut self, count: i32);
}

/// Player entity paired with a home.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// High half of the account id.
    pub high_id: i32,
    /// Low half of the account id.
    pub low_id: i32,
    /// Trophy count.
    pub trophies: i32,
    /// Current arena.
    pub arena: GlobalId,
    /// Crowns not yet pulled into the crown chest.
    pub star_count: i32,
    /// Cards found, as last published by the home.
    pub cards_found: i32,
    /// Chests held, as last published by the home.
    pub chest_count: i32,
}

impl Player {
    /// Create a player in the starting arena.
    pub fn new(high_id: i32, low_id: i32, content: &GameContent) -> Self {
        Self {
            high_id,
            low_id,
            trophies: 0,
            arena: content.starting_arena().id,
            star_count: 0,
            cards_found: 0,
            chest_count: 0,
        }
    }

    /// Record crowns won in a battle.
    pub fn add_stars(&mut self, count: i32) {
        self.star_count = self.star_count.saturating_add(count.max(0));
    }
}

impl Avatar for Player {
    fn star_count(&self) -> i32 {
        self.star_count
    }

    fn set_star_count(&mut self, count: i32) {
        self.star_count = count;
    }

    fn arena(&self) -> GlobalId {
        self.arena
    }

    fn refresh_arena(&mut self, content: &GameContent) {
        self.arena = content.arena_for_trophies(self.trophies).id;
    }

    fn set_cards_found(&mut self, count: i32) {
        self.cards_found = count;
    }

    fn set_chest_count(&mut self, count: i32) {
        self.chest_count = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_content;

    #[test]
    fn test_refresh_arena_follows_trophies() {
        let content = test_content();
        let mut player = Player::new(0, 1, &content);
        assert_eq!(player.arena, content.starting_arena().id);

        player.trophies = 900;
        player.refresh_arena(&content);
        assert_eq!(content.arena(player.arena).unwrap().name, "Bone Pit");
    }

    #[test]
    fn test_add_stars_ignores_negative() {
        let content = test_content();
        let mut player = Player::new(0, 1, &content);
        player.add_stars(3);
        player.add_stars(-2);
        assert_eq!(player.star_count(), 3);
    }
}
