//! Core deterministic primitives.
//!
//! The byte stream codec, the countdown timer and snapshot digests.
//! Nothing here performs I/O.

pub mod stream;
pub mod timer;
pub mod hash;

// Re-export core types
pub use stream::{ByteStream, CodecError, CodecResult};
pub use timer::Timer;
pub use hash::{snapshot_digest, SnapshotDigest};
