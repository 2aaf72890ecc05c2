//! Home Time Advancement
//!
//! `tick` advances a home by one second, `fast_forward` replays an offline
//! gap in bulk. Both drive the same phases in the same order:
//!
//! ```text
//! owned chests ─▶ free chest ─▶ crown cooldown ─▶ purchase claim
//!      ─▶ utility timers ─▶ crown threshold ─▶ pull crowns ─▶ cache arena
//! ```
//!
//! A gap of `n` seconds ends in the same state as `n` ticks, `last_tick`
//! aside. A timer that is already finished still spends the step it
//! restarts in, and a restart keeps the full duration on record. Neither
//! path touches I/O. Callers persist afterwards.

use chrono::{DateTime, Utc};

use crate::content::{GameContent, GlobalId};
use crate::game::events::HomeEvent;
use crate::game::home::{Home, PURCHASE_CLAIM_SOURCE};
use crate::game::player::Avatar;
use crate::TICK_SECONDS;

/// Result of advancing a home.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Events produced, in phase order.
    pub events: Vec<HomeEvent>,
}

impl TickResult {
    /// Whether nothing noteworthy happened.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Home {
    /// Advance by one step at wall-clock time `now`.
    pub fn tick(
        &mut self,
        content: &GameContent,
        player: &mut dyn Avatar,
        now: DateTime<Utc>,
    ) -> TickResult {
        let mut result = TickResult::default();
        self.last_tick = now.timestamp();
        self.advance(TICK_SECONDS, content, player, &mut result);
        result
    }

    /// Replay `seconds` of elapsed time in one step.
    ///
    /// Leaves the home where `seconds` calls to [`Home::tick`] would. Only
    /// one free chest can be waiting, so a gap spanning several free chest
    /// intervals yields a single chest. Events come out in a different order
    /// than ticking would produce them.
    pub fn fast_forward(
        &mut self,
        seconds: i32,
        content: &GameContent,
        player: &mut dyn Avatar,
    ) -> TickResult {
        let mut result = TickResult::default();
        if seconds <= 0 {
            return result;
        }

        // Crowns waiting on the player are pulled during the first second.
        self.advance(TICK_SECONDS, content, player, &mut result);
        if seconds > TICK_SECONDS {
            self.advance(seconds - TICK_SECONDS, content, player, &mut result);
        }
        result
    }

    fn advance(
        &mut self,
        seconds: i32,
        content: &GameContent,
        player: &mut dyn Avatar,
        result: &mut TickResult,
    ) {
        let arena = player.arena();
        self.advance_chests(seconds, result);

        // The crown threshold of the first second runs before a free chest
        // that only turns up later can take the next sequence number.
        let late_free_chest = self.free_chest.is_none()
            && self.free_chest_count != 0
            && self.free_chest_timer.remaining() > TICK_SECONDS
            && self.free_chest_timer.remaining() <= seconds;
        if late_free_chest {
            self.check_crown_threshold(content, arena, result);
        }

        self.advance_free_chest(seconds, content, arena, result);
        self.advance_crown_cooldown(seconds, content, result);
        self.reassert_purchase_claim();
        self.advance_utility_timers(seconds, result);
        self.finish_advance(content, player, result);
    }

    fn place_free_chest(
        &mut self,
        content: &GameContent,
        arena: GlobalId,
        result: &mut TickResult,
    ) -> bool {
        if !self.create_free_chest(content, arena) {
            return false;
        }
        if let Some(chest) = &self.free_chest {
            result.events.push(HomeEvent::FreeChestCreated {
                chest: chest.data,
                sequence: chest.sequence,
            });
        }
        true
    }

    fn advance_chests(&mut self, seconds: i32, result: &mut TickResult) {
        for (slot, chest) in self.chests.iter_mut().enumerate() {
            let Some(chest) = chest else { continue };
            let was_unlocking = chest.is_unlocking();
            chest.fast_forward(seconds);
            if was_unlocking && chest.is_ready() {
                result.events.push(HomeEvent::ChestUnlocked { slot });
            }
        }
    }

    fn advance_free_chest(
        &mut self,
        seconds: i32,
        content: &GameContent,
        arena: GlobalId,
        result: &mut TickResult,
    ) {
        if self.free_chest_count == 0 && self.free_chest.is_none() {
            self.place_free_chest(content, arena, result);
        }

        let due = self.free_chest_timer.remaining().max(TICK_SECONDS);
        if seconds < due {
            self.free_chest_timer.fast_forward(seconds);
            return;
        }

        self.free_chest_timer.reset();
        let created = self.free_chest.is_none() && self.place_free_chest(content, arena, result);
        if created || self.free_chest_count == 0 {
            let interval = content.globals().free_chest_interval_seconds();
            let mut skip = seconds - due;
            // Until the first collection the countdown restarts every interval.
            if self.free_chest_count == 0 && interval > 0 {
                skip %= interval;
            }
            self.start_free_chest_timer(0, content);
            self.free_chest_timer.fast_forward(skip);
        }
    }

    fn advance_crown_cooldown(
        &mut self,
        seconds: i32,
        content: &GameContent,
        result: &mut TickResult,
    ) {
        let due = self.star_chest_timer.remaining().max(TICK_SECONDS);
        if seconds < due {
            self.star_chest_timer.fast_forward(seconds);
            return;
        }

        let was_running = self.star_chest_timer.is_running();
        self.star_chest_timer.reset();
        let restarted = self.star_chest_cooldown;
        if restarted {
            self.start_star_chest_timer(0, content);
            self.star_chest_timer.fast_forward(seconds - due);
        }
        self.star_chest_cooldown = false;

        if (was_running || restarted) && self.star_chest_timer.is_finished() {
            result.events.push(HomeEvent::CrownCooldownFinished);
        }
    }

    fn reassert_purchase_claim(&mut self) {
        if self.claiming_reward {
            return;
        }
        if let Some(chest) = &mut self.purchased_chest {
            chest.set_claimed(PURCHASE_CLAIM_SOURCE);
        }
    }

    fn advance_utility_timers(&mut self, seconds: i32, result: &mut TickResult) {
        self.donation_cooldown_timer.fast_forward(seconds);
        self.request_cooldown_timer.fast_forward(seconds);
        self.elder_kick_timer.fast_forward(seconds);
        self.mail_timer.fast_forward(seconds);
        self.share_timer.fast_forward(seconds);

        let shop_was_running = self.shop_timer.is_running();
        self.shop_timer.fast_forward(seconds);
        if shop_was_running && self.shop_timer.is_finished() {
            result.events.push(HomeEvent::ShopRefreshDue);
        }
    }

    fn check_crown_threshold(
        &mut self,
        content: &GameContent,
        arena: GlobalId,
        result: &mut TickResult,
    ) {
        if let Some(chest) = self.check_star_chest_threshold(content, arena) {
            result.events.push(HomeEvent::CrownChestReady { chest });
        }
    }

    fn finish_advance(
        &mut self,
        content: &GameContent,
        player: &mut dyn Avatar,
        result: &mut TickResult,
    ) {
        self.check_crown_threshold(content, player.arena(), result);
        self.update_stars_from_avatar(player, content);
        self.update_arena_from_player(player);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{test_content, ContentFile, BUNDLED_CONTENT, CLASS_CHEST};
    use crate::core::hash::snapshot_digest;
    use crate::core::stream::ByteStream;
    use crate::game::player::Player;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn setup() -> (GameContent, Player, Home) {
        let content = test_content();
        let player = Player::new(0, 1, &content);
        let home = Home::new(0, 1, &content);
        (content, player, home)
    }

    /// Bundled content with one hour free chest and crown cooldowns.
    fn short_timer_content() -> GameContent {
        let mut file: ContentFile = serde_json::from_str(BUNDLED_CONTENT).unwrap();
        file.globals.free_chest_interval_hours = 1;
        file.globals.crown_chest_cooldown_hours = 1;
        GameContent::from_file(file).unwrap()
    }

    /// Run `seconds` ticks on one copy and a single fast-forward on another,
    /// then check both land on the same home, player and events.
    fn assert_ticks_match_fast_forward(
        content: &GameContent,
        home: &Home,
        player: &Player,
        seconds: i32,
    ) -> (Home, Player) {
        let mut ticked = home.clone();
        let mut ticked_player = player.clone();
        let now = Utc::now();
        let mut tick_events = Vec::new();
        for _ in 0..seconds {
            tick_events.extend(ticked.tick(content, &mut ticked_player, now).events);
        }

        let mut forwarded = home.clone();
        let mut forwarded_player = player.clone();
        let ff_events = forwarded.fast_forward(seconds, content, &mut forwarded_player).events;

        ticked.last_tick = forwarded.last_tick;
        assert_eq!(ticked, forwarded);
        assert_eq!(ticked.to_bytes(), forwarded.to_bytes());
        assert_eq!(ticked_player, forwarded_player);

        let mut kinds: Vec<_> = tick_events.iter().map(HomeEvent::kind).collect();
        let mut ff_kinds: Vec<_> = ff_events.iter().map(HomeEvent::kind).collect();
        kinds.sort_unstable();
        ff_kinds.sort_unstable();
        assert_eq!(kinds, ff_kinds);

        (forwarded, forwarded_player)
    }

    #[test]
    fn test_first_tick_creates_free_chest() {
        let (content, mut player, mut home) = setup();
        assert!(home.free_chest.is_none());

        let result = home.tick(&content, &mut player, Utc::now());

        assert!(home.free_chest.is_some());
        assert!(home.free_chest_timer.is_running());
        assert!(home.free_chest_timer.remaining() > 0);
        assert_eq!(home.running_chest_id, 1);
        assert!(matches!(
            result.events[..],
            [HomeEvent::FreeChestCreated { sequence: 1, .. }]
        ));
    }

    #[test]
    fn test_free_chest_not_duplicated() {
        let (content, mut player, mut home) = setup();
        let now = Utc::now();
        for _ in 0..20 {
            home.tick(&content, &mut player, now);
        }
        assert_eq!(home.running_chest_id, 1);
        assert_eq!(
            home.free_chest_timer.remaining(),
            content.globals().free_chest_interval_seconds() - 19
        );
    }

    #[test]
    fn test_free_chest_after_interval() {
        let (content, mut player, mut home) = setup();
        let now = Utc::now();
        home.tick(&content, &mut player, now);
        home.free_chest_collected();

        let interval = content.globals().free_chest_interval_seconds();
        for _ in 0..interval - 1 {
            home.tick(&content, &mut player, now);
            assert!(home.free_chest.is_none());
        }
        home.tick(&content, &mut player, now);
        assert!(home.free_chest.is_some());
        assert_eq!(home.free_chest_timer.remaining(), interval);
    }

    #[test]
    fn test_fast_forward_keeps_leftover_seconds() {
        let (content, mut player, mut home) = setup();
        home.tick(&content, &mut player, Utc::now());
        home.free_chest_collected();
        let remaining = home.free_chest_timer.remaining();

        let result = home.fast_forward(remaining + 50, &content, &mut player);

        assert!(home.free_chest.is_some());
        assert_eq!(
            home.free_chest_timer.remaining(),
            content.globals().free_chest_interval_seconds() - 50
        );
        assert_eq!(result.events.len(), 1);
    }

    #[test]
    fn test_fast_forward_long_gap_creates_one_chest() {
        let (content, mut player, mut home) = setup();
        home.tick(&content, &mut player, Utc::now());
        home.free_chest_collected();

        home.fast_forward(30 * 86_400, &content, &mut player);

        assert!(home.free_chest.is_some());
        assert_eq!(home.running_chest_id, 2);
        assert!(home.free_chest_timer.is_finished());
    }

    #[test]
    fn test_fast_forward_zero_is_noop() {
        let (content, mut player, mut home) = setup();
        let before = home.clone();
        assert!(home.fast_forward(0, &content, &mut player).is_empty());
        assert_eq!(home, before);
    }

    #[test]
    fn test_fast_forward_on_new_home_starts_free_timer() {
        let (content, mut player, mut home) = setup();
        let interval = content.globals().free_chest_interval_seconds();

        home.fast_forward(10, &content, &mut player);

        assert!(home.free_chest.is_some());
        assert_eq!(home.free_chest_timer.remaining(), interval - 9);
    }

    #[test]
    fn test_free_timer_cycles_before_first_collection() {
        let content = short_timer_content();
        let player = Player::new(0, 1, &content);
        let home = Home::new(0, 1, &content);
        let interval = content.globals().free_chest_interval_seconds();

        let (home, _) = assert_ticks_match_fast_forward(&content, &home, &player, 2 * interval + 7);

        assert_eq!(home.running_chest_id, 1);
        assert_eq!(home.free_chest_timer.remaining(), interval - 6);
    }

    #[test]
    fn test_finished_free_timer_restart_matches_ticks() {
        let (content, player, mut home) = setup();
        home.free_chest_count = 1;
        assert!(home.free_chest_timer.is_finished());

        let (home, _) = assert_ticks_match_fast_forward(&content, &home, &player, 15);

        assert!(home.free_chest.is_some());
        assert_eq!(
            home.free_chest_timer.remaining(),
            content.globals().free_chest_interval_seconds() - 14
        );
    }

    #[test]
    fn test_crown_cooldown_restart_matches_ticks() {
        let (content, player, mut home) = setup();
        home.star_chest_timer.start(10);
        home.star_chest_cooldown = true;

        let (home, _) = assert_ticks_match_fast_forward(&content, &home, &player, 15);

        assert!(!home.star_chest_cooldown);
        assert_eq!(
            home.star_chest_timer.remaining(),
            content.globals().crown_chest_cooldown_seconds() - 5
        );
    }

    #[test]
    fn test_tick_and_fast_forward_agree() {
        let (content, player, mut home) = setup();
        home.free_chest_count = 1;
        home.free_chest_timer.start(100);
        home.star_chest_timer.start(200);
        home.start_donation_cooldown(50);
        home.start_request_cooldown(400);
        home.mail_timer.start(149);
        let silver = content.chest(GlobalId::new(CLASS_CHEST, 1)).unwrap().clone();
        let mut chest = home.new_chest(&silver);
        chest.start_unlock(120);
        home.add_chest(chest, 0);

        let (home, _) = assert_ticks_match_fast_forward(&content, &home, &player, 150);

        assert_eq!(
            home.free_chest_timer.remaining(),
            content.globals().free_chest_interval_seconds() - 50
        );
        assert_eq!(home.star_chest_timer.remaining(), 50);
        assert!(home.chests[0].as_ref().unwrap().is_ready());
    }

    #[test]
    fn test_crown_chest_filled_from_player_stars() {
        let (content, mut player, mut home) = setup();
        player.add_stars(4);
        home.tick(&content, &mut player, Utc::now());
        assert_eq!(home.star_chest_counter, 4);
        assert_eq!(player.star_count, 0);

        player.add_stars(9);
        home.tick(&content, &mut player, Utc::now());
        assert_eq!(home.star_chest_counter, 10);
        assert!(home.star_chest.is_none());

        let result = home.tick(&content, &mut player, Utc::now());
        let crown_chest = content.starting_arena().crown_chest;
        assert_eq!(home.star_chest.as_ref().map(|chest| chest.data), Some(crown_chest));
        assert!(result.events.contains(&HomeEvent::CrownChestReady { chest: crown_chest }));
    }

    #[test]
    fn test_crown_cooldown_blocks_stars_until_finished() {
        let (content, mut player, mut home) = setup();
        home.star_chest_counter = 10;
        home.tick(&content, &mut player, Utc::now());
        home.crown_chest_collected(&content);

        let cooldown = content.globals().crown_chest_cooldown_seconds();
        player.add_stars(3);
        home.fast_forward(cooldown - 1, &content, &mut player);
        assert_eq!(home.star_chest_counter, 0);

        let result = home.fast_forward(1, &content, &mut player);
        assert!(result.events.contains(&HomeEvent::CrownCooldownFinished));

        player.add_stars(3);
        home.tick(&content, &mut player, Utc::now());
        assert_eq!(home.star_chest_counter, 3);
    }

    #[test]
    fn test_pending_stars_fill_crown_chest_before_late_free_chest() {
        let (content, mut player, mut home) = setup();
        home.free_chest_count = 1;
        home.free_chest_timer.start(30);
        home.star_chest_counter = 8;
        player.add_stars(5);

        let (home, _) = assert_ticks_match_fast_forward(&content, &home, &player, 60);

        assert_eq!(home.star_chest.as_ref().map(|chest| chest.sequence), Some(0));
        assert_eq!(home.free_chest.as_ref().map(|chest| chest.sequence), Some(1));
    }

    #[test]
    fn test_purchase_claim_respects_claiming_reward() {
        let (content, mut player, mut home) = setup();
        home.chest_purchased(GlobalId::new(CLASS_CHEST, 5), 2, &content);
        home.purchased_chest.as_mut().unwrap().claimed = None;

        home.set_claiming_reward(true);
        home.tick(&content, &mut player, Utc::now());
        assert!(!home.purchased_chest.as_ref().unwrap().is_claimed());

        home.set_claiming_reward(false);
        home.tick(&content, &mut player, Utc::now());
        assert_eq!(
            home.purchased_chest.as_ref().unwrap().claimed,
            Some(PURCHASE_CLAIM_SOURCE)
        );
    }

    #[test]
    fn test_tick_caches_arena_and_timestamp() {
        let (content, mut player, mut home) = setup();
        player.trophies = 900;
        player.refresh_arena(&content);
        let now = Utc::now();

        home.tick(&content, &mut player, now);

        assert_eq!(home.last_arena, Some(player.arena));
        assert_eq!(home.last_tick, now.timestamp());
    }

    #[test]
    fn test_random_sessions_round_trip() {
        let content = test_content();
        let magical = GlobalId::new(CLASS_CHEST, 5);
        let cap = content.globals().crown_chest_crown_count;

        for seed in 0..16u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut player = Player::new(0, seed as i32, &content);
            let mut home = Home::new(0, seed as i32, &content);
            let now = Utc::now();

            for _ in 0..300 {
                match rng.gen_range(0..8) {
                    0 | 1 => {
                        home.tick(&content, &mut player, now);
                    }
                    2 => {
                        home.fast_forward(rng.gen_range(1..20_000), &content, &mut player);
                    }
                    3 => player.add_stars(rng.gen_range(0..4)),
                    4 => {
                        home.free_chest_collected();
                    }
                    5 => {
                        home.crown_chest_collected(&content);
                    }
                    6 => {
                        home.chest_purchased(magical, 1, &content);
                    }
                    _ => {
                        home.purchased_chest_collected();
                    }
                }
                assert!(home.star_chest_counter <= cap);
            }

            let bytes = home.to_bytes();
            let mut stream = ByteStream::from_bytes(bytes.clone());
            let decoded = Home::decode(&mut stream).unwrap();
            assert!(stream.is_at_end());
            assert_eq!(decoded, home);
            assert_eq!(snapshot_digest(&decoded.to_bytes()), snapshot_digest(&bytes));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_fast_forward_matches_ticks(
            free_remaining in 0..5_000i32,
            free_chest_count in 0..3i32,
            has_free_chest in any::<bool>(),
            star_remaining in 0..5_000i32,
            star_cooldown in any::<bool>(),
            star_counter in 0..=10i32,
            pending_stars in 0..12i32,
            unlock_seconds in 1..5_000i32,
            mail_remaining in 0..5_000i32,
            seconds in 1..9_000i32,
        ) {
            let content = short_timer_content();
            let mut player = Player::new(0, 1, &content);
            player.add_stars(pending_stars);

            let mut home = Home::new(0, 1, &content);
            home.free_chest_count = free_chest_count;
            home.free_chest_timer.start(free_remaining);
            if has_free_chest {
                home.create_free_chest(&content, player.arena());
            }
            home.star_chest_timer.start(star_remaining);
            home.star_chest_cooldown = star_cooldown;
            home.star_chest_counter = star_counter;
            home.mail_timer.start(mail_remaining);
            let silver = content.chest(GlobalId::new(CLASS_CHEST, 1)).unwrap().clone();
            let mut chest = home.new_chest(&silver);
            chest.start_unlock(unlock_seconds);
            home.add_chest(chest, 0);

            assert_ticks_match_fast_forward(&content, &home, &player, seconds);
        }
    }
}
