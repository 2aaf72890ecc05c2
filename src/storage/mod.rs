//! Snapshot Store
//!
//! One file per home, holding exactly the bytes [`Home::encode`] produces.
//! Writes go to a temporary file first and are renamed into place, so a
//! crash never leaves a half-written snapshot behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::content::GameContent;
use crate::core::hash::{short_hex, snapshot_digest, SnapshotDigest};
use crate::core::stream::CodecError;
use crate::game::home::Home;

/// Snapshot file extension.
pub const SNAPSHOT_EXTENSION: &str = "home";

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot bytes do not decode.
    #[error("corrupt snapshot for home {home_id}: {source}")]
    Codec {
        /// Home the snapshot belongs to.
        home_id: i64,
        /// Decode failure.
        source: CodecError,
    },
}

/// Directory of home snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store rooted at `dir`, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a home's snapshot lives in.
    pub fn path_for(&self, home_id: i64) -> PathBuf {
        self.dir.join(format!("{:016x}.{}", home_id, SNAPSHOT_EXTENSION))
    }

    /// Persist `home`, returning the digest of the written bytes.
    pub async fn save(&self, home: &Home) -> Result<SnapshotDigest, StoreError> {
        let home_id = home.home_id();
        let bytes = home.to_bytes();
        let digest = snapshot_digest(&bytes);

        let path = self.path_for(home_id);
        let tmp = path.with_extension(format!("{}.tmp", SNAPSHOT_EXTENSION));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(home_id, bytes = bytes.len(), digest = %short_hex(&digest), "Snapshot saved");
        Ok(digest)
    }

    /// Load a home.
    ///
    /// A missing or empty file is not an error: it is logged and `None` is
    /// returned so the caller can start a fresh home.
    pub async fn load(&self, home_id: i64) -> Result<Option<Home>, StoreError> {
        let path = self.path_for(home_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(home_id, path = %path.display(), "No snapshot found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.is_empty() {
            warn!(home_id, path = %path.display(), "Snapshot file is empty");
            return Ok(None);
        }

        let home =
            Home::from_bytes(&bytes).map_err(|source| StoreError::Codec { home_id, source })?;
        debug!(home_id, digest = %short_hex(&snapshot_digest(&bytes)), "Snapshot loaded");
        Ok(Some(home))
    }

    /// Load a home, or create a fresh one when no usable snapshot exists.
    pub async fn load_or_create(
        &self,
        high_id: i32,
        low_id: i32,
        content: &GameContent,
    ) -> Result<Home, StoreError> {
        let fresh = Home::new(high_id, low_id, content);
        match self.load(fresh.home_id()).await? {
            Some(home) => Ok(home),
            None => {
                info!(home_id = fresh.home_id(), "Creating new home");
                Ok(fresh)
            }
        }
    }

    /// Remove a home's snapshot. Returns whether a file existed.
    pub async fn delete(&self, home_id: i64) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(self.path_for(home_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) fn temp_store_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "crown-home-{}-{}-{:08x}",
        name,
        std::process::id(),
        rand::random::<u32>()
    ))
}
