//! Snapshot Digests
//!
//! SHA-256 over encoded home bytes, used to compare replays (ticks versus a
//! fast-forward) and to correlate snapshots in logs. Not part of the wire
//! format.

use sha2::{Sha256, Digest};

/// Digest output type (256 bits / 32 bytes)
pub type SnapshotDigest = [u8; 32];

/// Domain separator for encoded home snapshots.
pub const HOME_SNAPSHOT_DOMAIN: &[u8] = b"CROWN_HOME_SNAPSHOT_V1";

/// Compute a simple hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> SnapshotDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> SnapshotDigest {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Digest of an encoded home snapshot.
pub fn snapshot_digest(encoded: &[u8]) -> SnapshotDigest {
    hash_with_domain(HOME_SNAPSHOT_DOMAIN, encoded)
}

/// Short hex prefix of a digest for log lines.
pub fn short_hex(digest: &SnapshotDigest) -> String {
    hex::encode(&digest[..8])
}
