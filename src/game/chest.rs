//! Treasure Chests
//!
//! A chest references an immutable chest definition and carries its own
//! unlock progress. Slot state machine:
//!
//! ```text
//! Empty ──create──▶ Locked ──start_unlock──▶ Unlocking ──timer──▶ Ready ──collect──▶ Empty
//!                     └────────── unlock_seconds == 0 ────────────▲
//! ```

use tracing::warn;

use crate::content::{ChestData, GlobalId, CLASS_CHEST};
use crate::core::stream::{ByteStream, CodecError, CodecResult};
use crate::core::timer::Timer;

/// Unlock progress of a chest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChestState {
    /// Waiting for a worker.
    Locked,
    /// Counting down.
    Unlocking(Timer),
    /// Ready to collect.
    Ready,
}

impl ChestState {
    fn tag(&self) -> i32 {
        match self {
            ChestState::Locked => 0,
            ChestState::Unlocking(_) => 1,
            ChestState::Ready => 2,
        }
    }
}

/// A chest owned by a home.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chest {
    /// Chest definition.
    pub data: GlobalId,
    /// Generic slot index (-1 for the dedicated slots).
    pub slot: i32,
    /// Value of the home's running chest id when this chest was created.
    pub sequence: i32,
    /// Unlock progress.
    pub state: ChestState,
    /// Where the chest came from.
    pub source: i32,
    /// Claim source once the chest has been claimed.
    pub claimed: Option<i32>,
}

impl Chest {
    /// Create a chest from its definition.
    ///
    /// Chests without an unlock time start out ready.
    pub fn new(data: &ChestData, sequence: i32) -> Self {
        let state = if data.unlock_seconds > 0 {
            ChestState::Locked
        } else {
            ChestState::Ready
        };

        Self {
            data: data.id,
            slot: -1,
            sequence,
            state,
            source: 0,
            claimed: None,
        }
    }

    /// Start unlocking a locked chest.
    pub fn start_unlock(&mut self, seconds: i32) -> bool {
        if self.state != ChestState::Locked {
            warn!(
                chest = %self.data,
                state = ?self.state,
                "Chest::start_unlock() - chest is not locked"
            );
            return false;
        }

        let mut timer = Timer::new();
        timer.start(seconds);
        self.state = if timer.is_finished() {
            ChestState::Ready
        } else {
            ChestState::Unlocking(timer)
        };
        true
    }

    /// Advance unlock progress by one step.
    pub fn tick(&mut self) {
        if let ChestState::Unlocking(timer) = &mut self.state {
            timer.tick();
            if timer.is_finished() {
                self.state = ChestState::Ready;
            }
        }
    }

    /// Advance unlock progress by `seconds`.
    pub fn fast_forward(&mut self, seconds: i32) {
        if let ChestState::Unlocking(timer) = &mut self.state {
            timer.fast_forward(seconds);
            if timer.is_finished() {
                self.state = ChestState::Ready;
            }
        }
    }

    /// Whether a worker is assigned.
    #[inline]
    pub fn is_unlocking(&self) -> bool {
        matches!(self.state, ChestState::Unlocking(_))
    }

    /// Whether the chest can be collected.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == ChestState::Ready
    }

    /// Seconds until the chest is ready (0 when not unlocking).
    pub fn unlock_remaining(&self) -> i32 {
        match self.state {
            ChestState::Unlocking(timer) => timer.remaining(),
            _ => 0,
        }
    }

    /// Record where the chest came from.
    pub fn set_source(&mut self, source: i32) {
        self.source = source;
    }

    /// Mark the chest claimed against `source`.
    pub fn set_claimed(&mut self, source: i32) {
        self.claimed = Some(source);
    }

    /// Whether the chest has been claimed.
    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.claimed.is_some()
    }

    /// Encode the chest.
    pub fn encode(&self, stream: &mut ByteStream) {
        stream.write_data_ref(Some(self.data));
        stream.write_vint(self.slot);
        stream.write_vint(self.sequence);
        stream.write_vint(self.state.tag());
        if let ChestState::Unlocking(timer) = &self.state {
            timer.encode(stream);
        }
        stream.write_vint(self.source);
        stream.write_boolean(self.claimed.is_some());
        if let Some(claim_source) = self.claimed {
            stream.write_vint(claim_source);
        }
    }

    /// Decode a chest written by [`Chest::encode`].
    pub fn decode(stream: &mut ByteStream) -> CodecResult<Self> {
        let data = stream
            .read_data_ref_of(CLASS_CHEST)?
            .ok_or(CodecError::DataClassMismatch { expected: CLASS_CHEST, got: 0 })?;
        let slot = stream.read_vint()?;
        let sequence = stream.read_vint()?;
        let state = match stream.read_vint()? {
            0 => ChestState::Locked,
            1 => ChestState::Unlocking(Timer::decode(stream)?),
            2 => ChestState::Ready,
            tag => return Err(CodecError::UnknownVariant { what: "chest state", tag }),
        };
        let source = stream.read_vint()?;
        let claimed = if stream.read_boolean()? {
            Some(stream.read_vint()?)
        } else {
            None
        };

        Ok(Self {
            data,
            slot,
            sequence,
            state,
            source,
            claimed,
        })
    }

    /// Encode an optional chest as a presence flag plus payload.
    pub fn encode_optional(chest: Option<&Chest>, stream: &mut ByteStream) {
        stream.write_boolean(chest.is_some());
        if let Some(chest) = chest {
            chest.encode(stream);
        }
    }

    /// Decode an optional chest written by [`Chest::encode_optional`].
    pub fn decode_optional(stream: &mut ByteStream) -> CodecResult<Option<Chest>> {
        if stream.read_boolean()? {
            Ok(Some(Chest::decode(stream)?))
        } else {
            Ok(None)
        }
    }
}
