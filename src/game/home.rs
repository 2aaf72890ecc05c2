//! Home Aggregate
//!
//! The per-player root entity. Owns the deck manager, chest slots, shop and
//! every cooldown timer. Gameplay mutations live here; time advancement lives
//! in [`crate::game::tick`].
//!
//! ## Snapshot Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ long home_id │ vint running_chest_id │ vint free_chest_count │
//! │ free chest timer │ vint donation_capacity_limit              │
//! ├─────────────────────────────────────────────────────────────┤
//! │ saved decks │ active deck │ collection │ vint selected deck  │
//! ├─────────────────────────────────────────────────────────────┤
//! │ extension block (vint version + bytes, opaque)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │ generic chest slots │ free / star / purchased / clan chests │
//! │ star counter + cooldown + timer │ cooldown timers           │
//! │ seen state │ shop │ social timers │ diamond idx │ last tick │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::content::{ChestData, GameContent, GlobalId, CLASS_ARENA};
use crate::core::stream::{ByteStream, CodecResult};
use crate::core::timer::Timer;
use crate::game::chest::Chest;
use crate::game::deck::{DeckManager, Spell};
use crate::game::player::Avatar;
use crate::game::shop::ShopItem;

/// Claim source used when a purchased chest resolves itself.
pub const PURCHASE_CLAIM_SOURCE: i32 = 4;

/// Version written in front of the extension payload.
pub const EXTENSION_BLOCK_VERSION: i32 = 1;

// =============================================================================
// Extension Block
// =============================================================================

/// Versioned payload carried through a snapshot without interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionBlock {
    /// Payload format version.
    pub version: i32,
    /// Raw payload.
    pub payload: Vec<u8>,
}

impl Default for ExtensionBlock {
    fn default() -> Self {
        Self {
            version: EXTENSION_BLOCK_VERSION,
            payload: Vec::new(),
        }
    }
}

impl ExtensionBlock {
    /// Build a block from a hex fixture.
    pub fn from_hex(version: i32, payload: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self {
            version,
            payload: hex::decode(payload)?,
        })
    }

    /// Encode the block.
    pub fn encode(&self, stream: &mut ByteStream) {
        stream.write_vint(self.version);
        stream.write_bytes(Some(&self.payload));
    }

    /// Decode the block.
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let version = stream.read_vint()?;
        let payload = stream.read_bytes()?.unwrap_or_default();
        Ok(Self { version, payload })
    }
}

// =============================================================================
// Home
// =============================================================================

/// Per-player home state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Home {
    /// High half of the home id.
    pub high_id: i32,
    /// Low half of the home id.
    pub low_id: i32,

    // Chests
    /// Incremented for every created free or purchased chest.
    pub running_chest_id: i32,
    /// Free chests collected.
    pub free_chest_count: i32,
    /// Countdown to the next free chest.
    pub free_chest_timer: Timer,
    /// Generic chest slots.
    pub chests: Vec<Option<Chest>>,
    /// Free chest slot.
    pub free_chest: Option<Chest>,
    /// Crown chest slot.
    pub star_chest: Option<Chest>,
    /// Purchased chest slot.
    pub purchased_chest: Option<Chest>,
    /// Clan crown chest slot.
    pub clan_crown_chest: Option<Chest>,
    /// Shop chest slot.
    pub shop_chest: Option<Chest>,
    /// Crowns collected towards the crown chest.
    pub star_chest_counter: i32,
    /// Cooldown owed once the crown timer finishes.
    pub star_chest_cooldown: bool,
    /// Crown chest cooldown.
    pub star_chest_timer: Timer,
    /// Position in the free chest diamond loop.
    pub free_chest_idx: i32,
    /// Position in the crown chest diamond loop.
    pub crown_chest_idx: i32,

    // Cards
    /// Deck, collection and presets.
    pub decks: DeckManager,

    // Shop
    /// Shop day.
    pub shop_day: i32,
    /// Shop seed.
    pub shop_seed: i32,
    /// Last shop day the player saw.
    pub shop_day_seen: i32,
    /// Day of year the shop was generated for.
    pub day_of_year: i32,
    /// Current offers.
    pub shop_items: Vec<ShopItem>,
    /// Countdown to the next shop refresh.
    pub shop_timer: Timer,

    // Social
    /// Donation capacity.
    pub donation_capacity_limit: i32,
    /// Donation capacity cooldown.
    pub donation_cooldown_timer: Timer,
    /// Card request cooldown.
    pub request_cooldown_timer: Timer,
    /// Replay share cooldown.
    pub share_timer: Timer,
    /// Clan mail cooldown.
    pub mail_timer: Timer,
    /// Elder kick cooldown.
    pub elder_kick_timer: Timer,

    // Seen
    /// Bit per page the player has opened.
    pub page_opened: i32,
    /// Last level shown in the level-up popup.
    pub last_levelup_popup: i32,
    /// Arena the player was in at the last tick.
    pub last_arena: Option<GlobalId>,
    /// Tutorial step.
    pub tutorial: i32,

    /// Opaque versioned payload.
    pub extension: ExtensionBlock,
    /// Unix seconds of the last tick, 0 before the first one.
    pub last_tick: i64,
    /// Set while a reward claim is in flight. Not persisted.
    pub claiming_reward: bool,
}

impl Home {
    /// Create an empty home.
    pub fn new(high_id: i32, low_id: i32, content: &GameContent) -> Self {
        let globals = content.globals();

        let mut shop_timer = Timer::new();
        shop_timer.start(globals.shop_refresh_seconds);

        Self {
            high_id,
            low_id,
            running_chest_id: 0,
            free_chest_count: 0,
            free_chest_timer: Timer::new(),
            chests: vec![None; globals.chest_slot_count],
            free_chest: None,
            star_chest: None,
            purchased_chest: None,
            clan_crown_chest: None,
            shop_chest: None,
            star_chest_counter: 0,
            star_chest_cooldown: false,
            star_chest_timer: Timer::new(),
            free_chest_idx: 0,
            crown_chest_idx: 0,
            decks: DeckManager::new(),
            shop_day: 0,
            shop_seed: 0,
            shop_day_seen: 0,
            day_of_year: 0,
            shop_items: Vec::new(),
            shop_timer,
            donation_capacity_limit: 0,
            donation_cooldown_timer: Timer::new(),
            request_cooldown_timer: Timer::new(),
            share_timer: Timer::new(),
            mail_timer: Timer::new(),
            elder_kick_timer: Timer::new(),
            page_opened: 0,
            last_levelup_popup: 1,
            last_arena: None,
            tutorial: 0,
            extension: ExtensionBlock::default(),
            last_tick: 0,
            claiming_reward: false,
        }
    }

    /// 64-bit id built from the high/low pair.
    #[inline]
    pub fn home_id(&self) -> i64 {
        ((self.high_id as i64) << 32) | (self.low_id as u32 as i64)
    }

    /// Integrity value the client compares against its own state.
    pub fn checksum(&self) -> i32 {
        let collection = self.decks.collection().len() as i32;
        self.running_chest_id.wrapping_add(collection.wrapping_shl(16))
    }

    /// Last tick as a timestamp.
    pub fn last_tick_time(&self) -> Option<DateTime<Utc>> {
        if self.last_tick == 0 {
            return None;
        }
        DateTime::<Utc>::from_timestamp(self.last_tick, 0)
    }

    /// Whole seconds since the last tick, 0 for a home that never ticked.
    pub fn seconds_since_last_save(&self, now: DateTime<Utc>) -> i32 {
        if self.last_tick == 0 {
            return 0;
        }
        let elapsed = now.timestamp().saturating_sub(self.last_tick).max(0);
        i32::try_from(elapsed).unwrap_or(i32::MAX)
    }

    // =========================================================================
    // Cards
    // =========================================================================

    /// Give the home a card.
    pub fn add_spell(&mut self, spell: Spell) -> bool {
        self.decks.add_spell(spell)
    }

    /// Switch the active deck to preset `index`.
    pub fn set_selected_deck(&mut self, index: usize, content: &GameContent) {
        self.decks.select_preset(index, content);
    }

    /// Cards owned.
    pub fn spell_count(&self) -> usize {
        self.decks.spell_count()
    }

    // =========================================================================
    // Free & Crown Chests
    // =========================================================================

    /// Put a new free chest from the player's arena into the free slot.
    pub(crate) fn create_free_chest(&mut self, content: &GameContent, arena: GlobalId) -> bool {
        if self.free_chest.is_some() {
            info!(
                home = self.home_id(),
                "Home::create_free_chest() - free chest slot already taken"
            );
            return false;
        }

        let Some(data) = content.arena(arena).and_then(|a| content.chest(a.free_chest)) else {
            warn!(
                home = self.home_id(),
                %arena,
                "Home::create_free_chest() - no free chest for arena"
            );
            return false;
        };

        self.running_chest_id = self.running_chest_id.wrapping_add(1);
        self.free_chest = Some(Chest::new(data, self.running_chest_id));
        true
    }

    /// Restart the free chest countdown, minus `skip_seconds` already elapsed.
    pub fn start_free_chest_timer(&mut self, skip_seconds: i32, content: &GameContent) {
        let interval = content.globals().free_chest_interval_seconds();
        let duration = interval - self.free_chest_timer.remaining() - skip_seconds;
        self.free_chest_timer.start(duration);
    }

    /// Restart the crown chest cooldown, minus `skip_seconds` already elapsed.
    pub fn start_star_chest_timer(&mut self, skip_seconds: i32, content: &GameContent) {
        let cooldown = content.globals().crown_chest_cooldown_seconds();
        let duration = cooldown - self.star_chest_timer.remaining() - skip_seconds;
        self.star_chest_timer.start(duration);
    }

    /// Add crowns to the crown chest counter, capped at the crown threshold.
    pub fn increase_stars_to_star_chest(&mut self, count: i32, content: &GameContent) {
        if count <= 0 {
            return;
        }

        if self.star_chest_cooldown || self.star_chest_timer.is_running() {
            debug!(
                home = self.home_id(),
                count,
                "Home::increase_stars_to_star_chest() - crown chest on cooldown"
            );
            return;
        }

        let cap = content.globals().crown_chest_crown_count;
        self.star_chest_counter = self.star_chest_counter.saturating_add(count).min(cap);
    }

    /// Fill the crown chest once the counter reaches the threshold.
    ///
    /// Returns the chest definition when a new crown chest was placed.
    pub(crate) fn check_star_chest_threshold(
        &mut self,
        content: &GameContent,
        arena: GlobalId,
    ) -> Option<GlobalId> {
        if self.star_chest_counter < content.globals().crown_chest_crown_count {
            return None;
        }

        let Some(data) = content.arena(arena).and_then(|a| content.chest(a.crown_chest)) else {
            warn!(
                home = self.home_id(),
                %arena,
                "Home::check_star_chest_threshold() - no crown chest for arena"
            );
            return None;
        };

        if self.star_chest.as_ref().map_or(false, |chest| chest.data == data.id) {
            return None;
        }

        self.star_chest = Some(Chest::new(data, self.running_chest_id));
        Some(data.id)
    }

    /// Collect the crown chest and start its cooldown.
    pub fn crown_chest_collected(&mut self, content: &GameContent) -> Option<Chest> {
        let chest = self.star_chest.take();
        self.star_chest_counter = 0;

        if self.star_chest_timer.is_finished() {
            self.start_star_chest_timer(0, content);
        } else {
            self.star_chest_cooldown = true;
        }
        chest
    }

    /// Collect the free chest.
    pub fn free_chest_collected(&mut self) -> Option<Chest> {
        let chest = self.free_chest.take();
        if chest.is_none() {
            warn!(home = self.home_id(), "Home::free_chest_collected() - no free chest");
            return None;
        }
        self.free_chest_count = self.free_chest_count.saturating_add(1);
        chest
    }

    /// Advance the free chest diamond rotation.
    pub fn update_free_chest_diamond_index(&mut self, content: &GameContent) {
        self.free_chest_idx = next_loop_index(self.free_chest_idx, content);
    }

    /// Advance the crown chest diamond rotation.
    pub fn update_crown_chest_diamond_index(&mut self, content: &GameContent) {
        self.crown_chest_idx = next_loop_index(self.crown_chest_idx, content);
    }

    /// Diamonds the next free chest grants.
    pub fn free_chest_diamonds(&self, content: &GameContent) -> i32 {
        loop_value(self.free_chest_idx, content)
    }

    /// Diamonds the next crown chest grants.
    pub fn crown_chest_diamonds(&self, content: &GameContent) -> i32 {
        loop_value(self.crown_chest_idx, content)
    }

    // =========================================================================
    // Purchased & Generic Chests
    // =========================================================================

    /// Record a chest bought in the shop. Only one may be outstanding.
    pub fn chest_purchased(&mut self, data: GlobalId, source: i32, content: &GameContent) -> bool {
        let Some(chest_data) = content.chest(data) else {
            error!(
                home = self.home_id(),
                chest = %data,
                "Home::chest_purchased() - unknown chest data"
            );
            return false;
        };

        if self.purchased_chest.is_some() {
            error!(
                home = self.home_id(),
                "Home::chest_purchased() - previous purchased chest not collected"
            );
            return false;
        }

        self.running_chest_id = self.running_chest_id.wrapping_add(1);

        let mut chest = Chest::new(chest_data, self.running_chest_id);
        chest.set_source(source);
        chest.set_claimed(PURCHASE_CLAIM_SOURCE);
        self.purchased_chest = Some(chest);
        true
    }

    /// Collect the purchased chest.
    pub fn purchased_chest_collected(&mut self) -> Option<Chest> {
        self.purchased_chest.take()
    }

    /// Create a chest that takes the next running chest id.
    pub fn new_chest(&mut self, data: &ChestData) -> Chest {
        self.running_chest_id = self.running_chest_id.wrapping_add(1);
        Chest::new(data, self.running_chest_id)
    }

    /// Place `chest` into generic slot `idx`.
    pub fn add_chest(&mut self, mut chest: Chest, idx: usize) -> bool {
        match self.chests.get_mut(idx) {
            None => {
                warn!(home = self.home_id(), idx, "Home::add_chest() - slot out of range");
                false
            }
            Some(Some(_)) => {
                warn!(home = self.home_id(), idx, "Home::add_chest() - slot occupied");
                false
            }
            Some(slot) => {
                chest.slot = idx as i32;
                *slot = Some(chest);
                true
            }
        }
    }

    /// First empty generic slot.
    pub fn first_free_chest_slot(&self) -> Option<usize> {
        self.chests.iter().position(Option::is_none)
    }

    /// Chests currently unlocking.
    pub fn assigned_workers(&self) -> usize {
        self.chests.iter().flatten().filter(|chest| chest.is_unlocking()).count()
    }

    /// Additional chests that may start unlocking.
    pub fn free_workers(&self, content: &GameContent) -> usize {
        content.globals().max_chest_opening.saturating_sub(self.assigned_workers())
    }

    /// Start unlocking the chest in slot `idx`.
    pub fn start_chest_unlock(&mut self, idx: usize, content: &GameContent) -> bool {
        if self.free_workers(content) == 0 {
            warn!(home = self.home_id(), idx, "Home::start_chest_unlock() - no free worker");
            return false;
        }

        let home = self.home_id();
        let Some(chest) = self.chests.get_mut(idx).and_then(Option::as_mut) else {
            warn!(home, idx, "Home::start_chest_unlock() - no chest in slot");
            return false;
        };

        let Some(data) = content.chest(chest.data) else {
            warn!(
                home,
                idx,
                chest = %chest.data,
                "Home::start_chest_unlock() - unknown chest data"
            );
            return false;
        };

        chest.start_unlock(data.unlock_seconds)
    }

    /// Take a ready chest out of slot `idx`.
    pub fn collect_chest(&mut self, idx: usize) -> Option<Chest> {
        let home = self.home_id();
        match self.chests.get_mut(idx) {
            None => {
                warn!(home, idx, "Home::collect_chest() - slot out of range");
                None
            }
            Some(slot) if !slot.as_ref().map_or(false, Chest::is_ready) => {
                warn!(home, idx, "Home::collect_chest() - chest not ready");
                None
            }
            Some(slot) => slot.take(),
        }
    }

    /// Occupied generic slots.
    pub fn chest_count(&self) -> usize {
        self.chests.iter().flatten().count()
    }

    // =========================================================================
    // Player Link
    // =========================================================================

    /// Move crowns won by the player into the crown chest counter.
    pub fn update_stars_from_avatar(&mut self, player: &mut dyn Avatar, content: &GameContent) {
        let stars = player.star_count();
        if stars > 0 {
            player.set_star_count(0);
            self.increase_stars_to_star_chest(stars, content);
        }
    }

    /// Cache the player's arena.
    pub fn update_arena_from_player(&mut self, player: &dyn Avatar) {
        self.last_arena = Some(player.arena());
    }

    /// Publish the generic chest count to the player.
    pub fn update_chest_count_to_player(&self, player: &mut dyn Avatar) {
        player.set_chest_count(self.chest_count() as i32);
    }

    /// Publish the card count to the player.
    pub fn update_card_count_to_player(&self, player: &mut dyn Avatar) {
        player.set_cards_found(self.spell_count() as i32);
    }

    /// Called once the client has finished loading the home.
    pub fn loading_finished(&mut self, content: &GameContent, player: &mut dyn Avatar) {
        let selected = self.decks.selected();
        self.decks.save_current_deck_to(selected);

        if content.globals().refresh_arena_in_loading_finished {
            player.refresh_arena(content);
        }

        self.update_chest_count_to_player(player);
        self.update_card_count_to_player(player);
    }

    // =========================================================================
    // Seen State, Cooldowns & Shop
    // =========================================================================

    /// Mark `page` as opened.
    pub fn set_page_opened(&mut self, page: u32) {
        if page >= i32::BITS {
            warn!(page, "Home::set_page_opened() - page out of range");
            return;
        }
        self.page_opened |= 1 << page;
    }

    /// Record the level shown in the last level-up popup.
    pub fn set_last_shown_level_up(&mut self, level: i32) {
        self.last_levelup_popup = level;
    }

    /// Record the shop day the player saw.
    pub fn set_shop_weekday_index_seen(&mut self, day: i32) {
        self.shop_day_seen = day;
    }

    /// Flag a reward claim in flight.
    pub fn set_claiming_reward(&mut self, value: bool) {
        self.claiming_reward = value;
    }

    /// Start the donation capacity cooldown.
    pub fn start_donation_cooldown(&mut self, seconds: i32) {
        self.donation_cooldown_timer.start(seconds);
    }

    /// Start the card request cooldown.
    pub fn start_request_cooldown(&mut self, seconds: i32) {
        self.request_cooldown_timer.start(seconds);
    }

    /// Append a shop offer.
    pub fn add_shop_item(&mut self, item: ShopItem) {
        self.shop_items.push(item);
    }

    /// Remove the offer at `index`.
    pub fn remove_shop_item(&mut self, index: usize) -> Option<ShopItem> {
        if index >= self.shop_items.len() {
            warn!(index, "Home::remove_shop_item() - index out of range");
            return None;
        }
        Some(self.shop_items.remove(index))
    }

    /// Drop every offer.
    pub fn clear_shop_items(&mut self) {
        self.shop_items.clear();
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Encode the full home state.
    pub fn encode(&self, stream: &mut ByteStream) {
        stream.write_long(self.home_id());
        stream.write_vint(self.running_chest_id);
        stream.write_vint(self.free_chest_count);
        self.free_chest_timer.encode(stream);
        stream.write_vint(self.donation_capacity_limit);

        self.decks.encode(stream);
        self.extension.encode(stream);

        stream.write_vint(self.chests.len() as i32);
        for slot in &self.chests {
            Chest::encode_optional(slot.as_ref(), stream);
        }

        Chest::encode_optional(self.free_chest.as_ref(), stream);
        Chest::encode_optional(self.star_chest.as_ref(), stream);
        Chest::encode_optional(self.purchased_chest.as_ref(), stream);
        Chest::encode_optional(self.clan_crown_chest.as_ref(), stream);

        stream.write_vint(self.star_chest_counter);
        stream.write_boolean(self.star_chest_cooldown);
        self.star_chest_timer.encode(stream);

        self.donation_cooldown_timer.encode(stream);
        self.request_cooldown_timer.encode(stream);

        stream.write_vint(self.page_opened);
        stream.write_vint(self.last_levelup_popup);
        stream.write_data_ref(self.last_arena);

        stream.write_vint(self.shop_day);
        stream.write_vint(self.shop_seed);
        stream.write_vint(self.shop_day_seen);
        stream.write_vint(self.day_of_year);
        stream.write_vint(self.shop_items.len() as i32);
        for item in &self.shop_items {
            item.encode(stream);
        }
        self.shop_timer.encode(stream);
        Chest::encode_optional(self.shop_chest.as_ref(), stream);

        self.share_timer.encode(stream);
        self.mail_timer.encode(stream);
        self.elder_kick_timer.encode(stream);

        stream.write_vint(self.free_chest_idx);
        stream.write_vint(self.crown_chest_idx);
        stream.write_vint(self.tutorial);
        stream.write_long(self.last_tick);
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut stream = ByteStream::with_capacity(512);
        self.encode(&mut stream);
        stream.into_bytes()
    }

    /// Decode a home written by [`Home::encode`].
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let home_id = stream.read_long()?;
        let running_chest_id = stream.read_vint()?;
        let free_chest_count = stream.read_vint()?;
        let free_chest_timer = Timer::decode(stream)?;
        let donation_capacity_limit = stream.read_vint()?;

        let decks = DeckManager::decode(stream)?;
        let extension = ExtensionBlock::decode(stream)?;

        let slot_count = stream.read_length("chest slots")?;
        let mut chests = Vec::with_capacity(slot_count.min(64));
        for _ in 0..slot_count {
            chests.push(Chest::decode_optional(stream)?);
        }

        let free_chest = Chest::decode_optional(stream)?;
        let star_chest = Chest::decode_optional(stream)?;
        let purchased_chest = Chest::decode_optional(stream)?;
        let clan_crown_chest = Chest::decode_optional(stream)?;

        let star_chest_counter = stream.read_vint()?;
        let star_chest_cooldown = stream.read_boolean()?;
        let star_chest_timer = Timer::decode(stream)?;

        let donation_cooldown_timer = Timer::decode(stream)?;
        let request_cooldown_timer = Timer::decode(stream)?;

        let page_opened = stream.read_vint()?;
        let last_levelup_popup = stream.read_vint()?;
        let last_arena = stream.read_data_ref_of(CLASS_ARENA)?;

        let shop_day = stream.read_vint()?;
        let shop_seed = stream.read_vint()?;
        let shop_day_seen = stream.read_vint()?;
        let day_of_year = stream.read_vint()?;
        let item_count = stream.read_length("shop items")?;
        let mut shop_items = Vec::with_capacity(item_count.min(64));
        for _ in 0..item_count {
            shop_items.push(ShopItem::decode(stream)?);
        }
        let shop_timer = Timer::decode(stream)?;
        let shop_chest = Chest::decode_optional(stream)?;

        let share_timer = Timer::decode(stream)?;
        let mail_timer = Timer::decode(stream)?;
        let elder_kick_timer = Timer::decode(stream)?;

        let free_chest_idx = stream.read_vint()?;
        let crown_chest_idx = stream.read_vint()?;
        let tutorial = stream.read_vint()?;
        let last_tick = stream.read_long()?;

        Ok(Self {
            high_id: (home_id >> 32) as i32,
            low_id: home_id as i32,
            running_chest_id,
            free_chest_count,
            free_chest_timer,
            chests,
            free_chest,
            star_chest,
            purchased_chest,
            clan_crown_chest,
            shop_chest,
            star_chest_counter,
            star_chest_cooldown,
            star_chest_timer,
            free_chest_idx,
            crown_chest_idx,
            decks,
            shop_day,
            shop_seed,
            shop_day_seen,
            day_of_year,
            shop_items,
            shop_timer,
            donation_capacity_limit,
            donation_cooldown_timer,
            request_cooldown_timer,
            share_timer,
            mail_timer,
            elder_kick_timer,
            page_opened,
            last_levelup_popup,
            last_arena,
            tutorial,
            extension,
            last_tick,
            claiming_reward: false,
        })
    }

    /// Decode a home from a complete buffer.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let mut stream = ByteStream::from_bytes(bytes);
        Self::decode(&mut stream)
    }
}

fn next_loop_index(index: i32, content: &GameContent) -> i32 {
    let len = content.globals().free_chest_diamond_loop.len() as i32;
    if len == 0 {
        return 0;
    }
    (index + 1).rem_euclid(len)
}

fn loop_value(index: i32, content: &GameContent) -> i32 {
    let diamonds = &content.globals().free_chest_diamond_loop;
    usize::try_from(index)
        .ok()
        .and_then(|i| diamonds.get(i))
        .copied()
        .unwrap_or(0)
}
