//! Deck Manager
//!
//! Owned cards live in exactly one of two places: the 8-slot active deck or
//! the collection. Five saved presets store raw card ids and are loaded by
//! moving cards between the two, never by creating or dropping any.
//!
//! Preset entries use two sentinels: [`EMPTY_CARD`] for a slot that was empty
//! when saved and [`UNAVAILABLE_CARD`] for a slot whose card could not be
//! found when the preset was last loaded.

use tracing::{error, warn};

use crate::content::{GameContent, GlobalId, CLASS_CHARACTER};
use crate::core::stream::{ByteStream, CodecError, CodecResult};
use crate::{DECK_SIZE, SAVED_DECK_COUNT};

/// Preset entry for an empty slot.
pub const EMPTY_CARD: i32 = 0;

/// Preset entry for a card that could not be located.
pub const UNAVAILABLE_CARD: i32 = -1;

/// One saved preset.
pub type SavedDeck = [i32; DECK_SIZE];

// =============================================================================
// Spell
// =============================================================================

/// An owned card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spell {
    /// Card definition.
    pub data: GlobalId,
    /// Upgrade level.
    pub level: i32,
    /// Spare copies.
    pub count: i32,
}

impl Spell {
    /// A level-0 card with no spare copies.
    pub const fn new(data: GlobalId) -> Self {
        Self { data, level: 0, count: 0 }
    }

    /// Encode the card.
    pub fn encode(&self, stream: &mut ByteStream) {
        stream.write_data_ref(Some(self.data));
        stream.write_vint(self.level);
        stream.write_vint(self.count);
    }

    /// Decode a card written by [`Spell::encode`].
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let data = match stream.read_data_ref()? {
            Some(id) if id.is_card() => id,
            other => {
                return Err(CodecError::DataClassMismatch {
                    expected: CLASS_CHARACTER,
                    got: other.map_or(0, GlobalId::class_id),
                })
            }
        };

        Ok(Self {
            data,
            level: stream.read_vint()?,
            count: stream.read_vint()?,
        })
    }
}

// =============================================================================
// Deck & Collection
// =============================================================================

/// The active deck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpellDeck {
    slots: [Option<Spell>; DECK_SIZE],
}

impl SpellDeck {
    /// Card in `slot`.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&Spell> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Replace the card in `slot`, returning the previous occupant.
    pub fn set(&mut self, slot: usize, spell: Option<Spell>) -> Option<Spell> {
        std::mem::replace(&mut self.slots[slot], spell)
    }

    /// Swap two slots.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// Slot holding `data`.
    pub fn index_of(&self, data: GlobalId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.map_or(false, |spell| spell.data == data))
    }

    /// First empty slot.
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Occupied slots.
    pub fn spell_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.slots.iter().flatten()
    }

    /// Raw card id per slot, [`EMPTY_CARD`] for empty slots.
    pub fn card_ids(&self) -> SavedDeck {
        let mut ids = [EMPTY_CARD; DECK_SIZE];
        for (id, slot) in ids.iter_mut().zip(&self.slots) {
            if let Some(spell) = slot {
                *id = spell.data.raw();
            }
        }
        ids
    }
}

/// Owned cards outside the deck, in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpellCollection {
    spells: Vec<Spell>,
}

impl SpellCollection {
    /// Number of cards.
    #[inline]
    pub fn len(&self) -> usize {
        self.spells.len()
    }

    /// Whether the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Card at `index`.
    pub fn get(&self, index: usize) -> Option<&Spell> {
        self.spells.get(index)
    }

    /// Position of `data`.
    pub fn index_of(&self, data: GlobalId) -> Option<usize> {
        self.spells.iter().position(|spell| spell.data == data)
    }

    /// Append a card.
    pub fn push(&mut self, spell: Spell) {
        self.spells.push(spell);
    }

    /// Replace the card at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, spell: Spell) -> Spell {
        std::mem::replace(&mut self.spells[index], spell)
    }

    /// Remove the card at `index`, keeping the order of the rest.
    pub fn remove(&mut self, index: usize) -> Spell {
        self.spells.remove(index)
    }

    /// Cards in order.
    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.iter()
    }
}

// =============================================================================
// Deck Manager
// =============================================================================

/// Active deck, collection and saved presets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckManager {
    saved: [SavedDeck; SAVED_DECK_COUNT],
    deck: SpellDeck,
    collection: SpellCollection,
    selected: usize,
}

impl DeckManager {
    /// Empty deck, empty collection, all presets empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active deck.
    #[inline]
    pub fn deck(&self) -> &SpellDeck {
        &self.deck
    }

    /// Collection.
    #[inline]
    pub fn collection(&self) -> &SpellCollection {
        &self.collection
    }

    /// Selected preset index.
    #[inline]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Saved preset `index`.
    pub fn saved_deck(&self, index: usize) -> Option<&SavedDeck> {
        self.saved.get(index)
    }

    /// Cards owned in total.
    pub fn spell_count(&self) -> usize {
        self.deck.spell_count() + self.collection.len()
    }

    /// Give the home a new card. The deck fills before the collection.
    pub fn add_spell(&mut self, spell: Spell) -> bool {
        if self.has_spell(spell.data) {
            error!(card = %spell.data, "DeckManager::add_spell() - card already owned");
            return false;
        }

        match self.deck.first_empty() {
            Some(slot) => {
                self.deck.set(slot, Some(spell));
            }
            None => self.collection.push(spell),
        }
        true
    }

    /// Owned card by position: deck cards in slot order, then the collection.
    pub fn spell_at(&self, index: usize) -> Option<&Spell> {
        let in_deck = self.deck.spell_count();
        if index < in_deck {
            return self.deck.iter().nth(index);
        }

        let spell = self.collection.get(index - in_deck);
        if spell.is_none() {
            warn!(index, "DeckManager::spell_at() - index out of bounds");
        }
        spell
    }

    /// Owned card by definition.
    pub fn spell_by_data(&self, data: GlobalId) -> Option<&Spell> {
        self.deck
            .index_of(data)
            .and_then(|slot| self.deck.get(slot))
            .or_else(|| self.collection.index_of(data).and_then(|i| self.collection.get(i)))
    }

    /// Whether the card is owned.
    pub fn has_spell(&self, data: GlobalId) -> bool {
        self.spell_by_data(data).is_some()
    }

    /// Cards in the catalog that are not owned yet.
    pub fn locked_spell_count(&self, content: &GameContent) -> usize {
        content.cards().filter(|card| !self.has_spell(card.id)).count()
    }

    /// Whether every owned card is at its copy cap.
    pub fn has_all_cards_full(&self) -> Option<bool> {
        // TODO: needs per-rarity copy caps in the content catalog before this can be answered.
        None
    }

    /// Store the active deck's card ids into preset `index`.
    pub fn save_current_deck_to(&mut self, index: usize) {
        if index >= SAVED_DECK_COUNT {
            error!(index, "DeckManager::save_current_deck_to() - deck index out of range");
            return;
        }
        self.saved[index] = self.deck.card_ids();
    }

    /// Switch to preset `index`.
    ///
    /// An all-empty preset is filled from the active deck instead of loaded.
    /// Entries that cannot be placed are rewritten to whatever occupies the
    /// slot afterwards ([`UNAVAILABLE_CARD`] when nothing does).
    pub fn select_preset(&mut self, index: usize, content: &GameContent) {
        if !content.globals().multiple_decks {
            return;
        }

        if index >= SAVED_DECK_COUNT {
            error!(index, "DeckManager::select_preset() - deck index out of range");
            return;
        }

        if self.selected != index {
            if self.saved[index].iter().all(|&id| id == EMPTY_CARD) {
                self.save_current_deck_to(index);
                return;
            }

            for slot in 0..DECK_SIZE {
                self.load_preset_slot(index, slot, content);
            }
        }

        self.selected = index;
    }

    fn load_preset_slot(&mut self, index: usize, slot: usize, content: &GameContent) {
        let wanted = self.saved[index][slot];
        if wanted == EMPTY_CARD {
            return;
        }

        if let Some(card) = content.card_by_raw(wanted) {
            if let Some(current) = self.deck.index_of(card.id) {
                if current != slot {
                    self.deck.swap(current, slot);
                }
                return;
            }

            if let Some(found) = self.collection.index_of(card.id) {
                let incoming = self.collection.spells[found];
                match self.deck.set(slot, Some(incoming)) {
                    Some(outgoing) => {
                        self.collection.replace(found, outgoing);
                    }
                    None => {
                        self.collection.remove(found);
                    }
                }
                return;
            }
        }

        self.saved[index][slot] = self
            .deck
            .get(slot)
            .map_or(UNAVAILABLE_CARD, |spell| spell.data.raw());
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Encode presets, deck, collection and selected index, in that order.
    pub fn encode(&self, stream: &mut ByteStream) {
        stream.write_vint(SAVED_DECK_COUNT as i32);
        for preset in &self.saved {
            stream.write_vint(DECK_SIZE as i32);
            for &id in preset {
                stream.write_vint(id);
            }
        }

        stream.write_vint(DECK_SIZE as i32);
        for slot in &self.deck.slots {
            stream.write_boolean(slot.is_some());
            if let Some(spell) = slot {
                spell.encode(stream);
            }
        }

        stream.write_vint(self.collection.len() as i32);
        for spell in self.collection.iter() {
            spell.encode(stream);
        }

        stream.write_vint(self.selected as i32);
    }

    /// Decode what [`DeckManager::encode`] wrote.
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        expect_length(stream, "saved deck count", SAVED_DECK_COUNT)?;
        let mut saved = [[EMPTY_CARD; DECK_SIZE]; SAVED_DECK_COUNT];
        for preset in saved.iter_mut() {
            expect_length(stream, "saved deck size", DECK_SIZE)?;
            for id in preset.iter_mut() {
                *id = stream.read_vint()?;
            }
        }

        expect_length(stream, "deck size", DECK_SIZE)?;
        let mut deck = SpellDeck::default();
        for slot in deck.slots.iter_mut() {
            if stream.read_boolean()? {
                *slot = Some(Spell::decode(stream)?);
            }
        }

        let len = stream.read_length("collection")?;
        let mut collection = SpellCollection::default();
        for _ in 0..len {
            collection.push(Spell::decode(stream)?);
        }

        let selected = stream.read_vint()?;
        if !(0..SAVED_DECK_COUNT as i32).contains(&selected) {
            return Err(CodecError::InvalidLength {
                what: "selected deck",
                length: selected as i64,
            });
        }

        Ok(Self {
            saved,
            deck,
            collection,
            selected: selected as usize,
        })
    }
}

fn expect_length(stream: &mut ByteStream, what: &'static str, expected: usize) -> CodecResult<()> {
    let length = stream.read_vint()?;
    if length as i64 != expected as i64 {
        return Err(CodecError::InvalidLength { what, length: length as i64 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_content;
    use proptest::prelude::*;

    fn card(instance: i32) -> GlobalId {
        GlobalId::new(CLASS_CHARACTER, instance)
    }

    /// Eight cards in the deck, `extra` more in the collection.
    fn manager_with(extra: i32) -> DeckManager {
        let mut decks = DeckManager::new();
        for i in 0..8 + extra {
            assert!(decks.add_spell(Spell::new(card(i))));
        }
        decks
    }

    #[test]
    fn test_add_spell_fills_deck_first() {
        let decks = manager_with(2);
        assert_eq!(decks.deck().spell_count(), 8);
        assert_eq!(decks.collection().len(), 2);
        assert_eq!(decks.spell_count(), 10);
        assert_eq!(decks.deck().get(0).unwrap().data, card(0));
        assert_eq!(decks.collection().get(1).unwrap().data, card(9));
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut decks = manager_with(0);
        assert!(!decks.add_spell(Spell::new(card(3))));
        assert_eq!(decks.spell_count(), 8);
    }

    #[test]
    fn test_spell_at_spans_deck_and_collection() {
        let decks = manager_with(3);
        assert_eq!(decks.spell_at(7).unwrap().data, card(7));
        assert_eq!(decks.spell_at(8).unwrap().data, card(8));
        assert_eq!(decks.spell_at(10).unwrap().data, card(10));
        assert!(decks.spell_at(11).is_none());
    }

    #[test]
    fn test_locked_spell_count() {
        let content = test_content();
        let decks = manager_with(2);
        assert_eq!(decks.locked_spell_count(&content), content.cards().count() - 10);
    }

    #[test]
    fn test_empty_preset_saves_current_deck() {
        let content = test_content();
        let mut decks = manager_with(2);
        let before = *decks.deck();

        decks.select_preset(2, &content);

        assert_eq!(decks.saved_deck(2).unwrap(), &before.card_ids());
        assert_eq!(decks.deck(), &before);
        assert_eq!(decks.selected(), 0);
    }

    #[test]
    fn test_select_preset_pulls_from_collection() {
        let content = test_content();
        let mut decks = manager_with(2);
        decks.saved[1] = decks.deck().card_ids();
        decks.saved[1][0] = card(9).raw();
        decks.saved[1][1] = card(0).raw();

        decks.select_preset(1, &content);

        assert_eq!(decks.selected(), 1);
        assert_eq!(decks.deck().get(0).unwrap().data, card(9));
        assert_eq!(decks.deck().get(1).unwrap().data, card(0));
        assert!(decks.collection().index_of(card(1)).is_some());
        assert_eq!(decks.spell_count(), 10);
    }

    #[test]
    fn test_select_preset_heals_unknown_and_unowned() {
        let content = test_content();
        let mut decks = manager_with(0);
        decks.saved[3] = decks.deck().card_ids();
        decks.saved[3][4] = 12_345_678;
        decks.saved[3][5] = GlobalId::new(crate::content::CLASS_SPELL, 2).raw();

        decks.select_preset(3, &content);

        assert_eq!(decks.saved_deck(3).unwrap(), &decks.deck().card_ids());
    }

    #[test]
    fn test_select_preset_heals_to_unavailable_for_empty_slot() {
        let content = test_content();
        let mut decks = DeckManager::new();
        decks.add_spell(Spell::new(card(0)));
        decks.saved[1] = [card(0).raw(), card(11).raw(), 0, 0, 0, 0, 0, 0];

        decks.select_preset(1, &content);

        assert_eq!(decks.saved_deck(1).unwrap()[0], card(0).raw());
        assert_eq!(decks.saved_deck(1).unwrap()[1], UNAVAILABLE_CARD);
        assert_eq!(decks.deck().get(0).unwrap().data, card(0));
        assert!(decks.deck().get(1).is_none());
    }

    #[test]
    fn test_select_preset_out_of_range() {
        let content = test_content();
        let mut decks = manager_with(1);
        let before = decks.clone();
        decks.select_preset(SAVED_DECK_COUNT, &content);
        assert_eq!(decks, before);
    }

    #[test]
    fn test_encode_decode() {
        let mut decks = manager_with(3);
        decks.save_current_deck_to(4);
        decks.selected = 4;
        decks.deck.set(5, None);

        let mut stream = ByteStream::new();
        decks.encode(&mut stream);
        let mut stream = ByteStream::from_bytes(stream.into_bytes());

        assert_eq!(DeckManager::decode(&mut stream).unwrap(), decks);
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_decode_rejects_wrong_preset_count() {
        let mut stream = ByteStream::new();
        stream.write_vint(4);
        let mut stream = ByteStream::from_bytes(stream.into_bytes());
        assert_eq!(
            DeckManager::decode(&mut stream),
            Err(CodecError::InvalidLength { what: "saved deck count", length: 4 })
        );
    }

    fn preset_entry() -> impl Strategy<Value = i32> {
        prop_oneof![
            Just(EMPTY_CARD),
            Just(UNAVAILABLE_CARD),
            (0..14i32).prop_map(|i| card(i).raw()),
            Just(99_000_001),
        ]
    }

    proptest! {
        #[test]
        fn prop_select_preset_keeps_card_count(
            owned in 0..12i32,
            presets in prop::collection::vec(
                prop::array::uniform8(preset_entry()),
                SAVED_DECK_COUNT,
            ),
            picks in prop::collection::vec(0..SAVED_DECK_COUNT + 1, 1..10),
        ) {
            let content = test_content();
            let mut decks = DeckManager::new();
            for i in 0..owned {
                decks.add_spell(Spell::new(card(i)));
            }
            for (slot, preset) in decks.saved.iter_mut().zip(presets) {
                *slot = preset;
            }
            let total = decks.spell_count();

            for pick in picks {
                decks.select_preset(pick, &content);
                prop_assert_eq!(decks.spell_count(), total);

                let mut ids: Vec<_> = decks
                    .deck()
                    .iter()
                    .chain(decks.collection().iter())
                    .map(|s| s.data)
                    .collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), total);
            }
        }
    }
}
