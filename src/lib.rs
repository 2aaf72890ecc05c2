//! # Crown Home
//!
//! Per-player home engine: deterministic timers and chest scheduling with
//! offline catch-up, plus the binary snapshot format shared by network
//! messages and persisted files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CROWN HOME                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                 │
//! │  ├── stream.rs   - Varint / fixed-width byte stream codec   │
//! │  ├── timer.rs    - Countdown timer                          │
//! │  └── hash.rs     - Snapshot digests                         │
//! │                                                             │
//! │  content/        - Card, chest, arena catalog + globals     │
//! │                                                             │
//! │  game/           - Home logic (pure, no I/O)                │
//! │  ├── player.rs   - Avatar seam                              │
//! │  ├── chest.rs    - Chest entity                             │
//! │  ├── deck.rs     - Deck, collection, presets                │
//! │  ├── shop.rs     - Shop offers                              │
//! │  ├── home.rs     - Aggregate root + encode/decode           │
//! │  ├── tick.rs     - Tick and fast-forward                    │
//! │  └── events.rs   - Home events                              │
//! │                                                             │
//! │  network/        - Framing + per-home session actor         │
//! │  storage/        - Snapshot files                           │
//! │  config.rs       - Environment configuration                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! `core/` and `game/` never read the clock or touch the filesystem. The
//! only time input is the timestamp passed to [`game::Home::tick`], which is
//! recorded but never used for arithmetic. Given the same starting snapshot
//! and the same sequence of calls, two homes encode to identical bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod content;
pub mod game;
pub mod network;
pub mod storage;
pub mod config;

// Re-export commonly used types
pub use crate::core::stream::{ByteStream, CodecError, CodecResult};
pub use crate::core::timer::Timer;
pub use crate::content::{GameContent, GlobalId};
pub use crate::game::{Avatar, Home, Player, TickResult};
pub use crate::config::EngineConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds one tick represents.
pub const TICK_SECONDS: i32 = 1;

/// Slots in the active deck.
pub const DECK_SIZE: usize = 8;

/// Saved deck presets per home.
pub const SAVED_DECK_COUNT: usize = 5;
