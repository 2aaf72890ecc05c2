//! Countdown Timer
//!
//! Second-granularity countdown used for chest cooldowns, unlocks and the
//! utility cooldowns on a home. `tick` and `fast_forward` must agree: N ticks
//! and one `fast_forward(N)` always leave the same remaining time.

use tracing::error;

use crate::core::stream::{ByteStream, CodecResult};
use crate::TICK_SECONDS;

/// Countdown timer in whole seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    duration: i32,
    remaining: i32,
    started: bool,
}

impl Timer {
    /// Create an idle timer.
    pub const fn new() -> Self {
        Self {
            duration: 0,
            remaining: 0,
            started: false,
        }
    }

    /// Start counting down from `duration` seconds.
    ///
    /// A running timer is left untouched; call [`Timer::reset`] first.
    pub fn start(&mut self, duration: i32) {
        if self.is_running() {
            error!(
                remaining = self.remaining,
                requested = duration,
                "Timer::start() - timer still running"
            );
            return;
        }

        self.duration = duration.max(0);
        self.remaining = self.duration;
        self.started = true;
    }

    /// Advance by one scheduler step.
    #[inline]
    pub fn tick(&mut self) {
        self.fast_forward(TICK_SECONDS);
    }

    /// Advance by `seconds` in one step.
    pub fn fast_forward(&mut self, seconds: i32) {
        if seconds <= 0 {
            return;
        }
        self.remaining = self.remaining.saturating_sub(seconds).max(0);
    }

    /// Finish the timer immediately.
    pub fn reset(&mut self) {
        self.remaining = 0;
    }

    /// Seconds left.
    #[inline]
    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    /// Duration passed to the last `start`.
    #[inline]
    pub fn duration(&self) -> i32 {
        self.duration
    }

    /// Whether the countdown reached zero (idle timers count as finished).
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining <= 0
    }

    /// Whether the countdown is in progress.
    #[inline]
    pub fn is_running(&self) -> bool {
        !self.is_finished()
    }

    /// Whether `start` has ever been called.
    #[inline]
    pub fn was_started(&self) -> bool {
        self.started
    }

    /// Encode remaining, duration and the started flag.
    pub fn encode(&self, stream: &mut ByteStream) {
        stream.write_vint(self.remaining);
        stream.write_vint(self.duration);
        stream.write_boolean(self.started);
    }

    /// Decode a timer written by [`Timer::encode`].
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let remaining = stream.read_vint()?.max(0);
        let duration = stream.read_vint()?;
        let started = stream.read_boolean()?;
        Ok(Self {
            duration,
            remaining,
            started,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_timer_is_idle() {
        let timer = Timer::new();
        assert!(timer.is_finished());
        assert!(!timer.was_started());
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_tick_to_zero_and_stays() {
        let mut timer = Timer::new();
        timer.start(10);

        for i in 1..=15 {
            timer.tick();
            if i < 10 {
                assert!(!timer.is_finished(), "finished early at tick {}", i);
            } else {
                assert_eq!(timer.remaining(), 0);
                assert!(timer.is_finished());
            }
        }
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut timer = Timer::new();
        timer.start(100);
        timer.fast_forward(40);
        timer.start(5);

        assert_eq!(timer.remaining(), 60);
        assert_eq!(timer.duration(), 100);
    }

    #[test]
    fn test_restart_after_reset() {
        let mut timer = Timer::new();
        timer.start(100);
        timer.reset();
        assert!(timer.is_finished());

        timer.start(5);
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn test_negative_duration_clamped() {
        let mut timer = Timer::new();
        timer.start(-30);
        assert!(timer.is_finished());
        assert!(timer.was_started());
    }

    #[test]
    fn test_fast_forward_ignores_negative() {
        let mut timer = Timer::new();
        timer.start(10);
        timer.fast_forward(-5);
        assert_eq!(timer.remaining(), 10);
    }

    #[test]
    fn test_encode_decode() {
        let mut timer = Timer::new();
        timer.start(3600);
        timer.fast_forward(61);

        let mut stream = ByteStream::new();
        timer.encode(&mut stream);

        let mut stream = ByteStream::from_bytes(stream.into_bytes());
        assert_eq!(Timer::decode(&mut stream).unwrap(), timer);
        assert!(stream.is_at_end());
    }

    proptest! {
        /// Splitting elapsed time across calls never changes the result.
        #[test]
        fn prop_fast_forward_associative(
            duration in 0i32..1_000_000,
            s1 in 0i32..500_000,
            s2 in 0i32..500_000,
        ) {
            let mut split = Timer::new();
            split.start(duration);
            split.fast_forward(s1);
            split.fast_forward(s2);

            let mut whole = Timer::new();
            whole.start(duration);
            whole.fast_forward(s1 + s2);

            prop_assert_eq!(split.remaining(), whole.remaining());
        }

        /// N ticks equal one fast-forward of N seconds.
        #[test]
        fn prop_ticks_match_fast_forward(duration in 0i32..5_000, elapsed in 0i32..6_000) {
            let mut ticked = Timer::new();
            ticked.start(duration);
            for _ in 0..elapsed {
                ticked.tick();
            }

            let mut forwarded = Timer::new();
            forwarded.start(duration);
            forwarded.fast_forward(elapsed);

            prop_assert_eq!(ticked, forwarded);
        }
    }
}
