//! Engine Configuration
//!
//! Runtime settings read from the environment. Gameplay tunables are not
//! here; they ship with the content catalog (see [`crate::content::Globals`]).

use std::path::PathBuf;
use std::time::Duration;

/// Default tick cadence in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Wall-clock time between ticks.
    pub tick_interval: Duration,
    /// Directory snapshots are stored in.
    pub snapshot_dir: PathBuf,
    /// Content catalog to load instead of the bundled one.
    pub content_path: Option<PathBuf>,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            snapshot_dir: PathBuf::from("snapshots"),
            content_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the environment.
    ///
    /// - `HOME_TICK_MS`: tick cadence, must be positive
    /// - `HOME_SNAPSHOT_DIR`: snapshot directory
    /// - `HOME_CONTENT_PATH`: content catalog JSON
    /// - `HOME_LOG`: log filter
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            tick_interval: lookup("HOME_TICK_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            snapshot_dir: lookup("HOME_SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_dir),
            content_path: lookup("HOME_CONTENT_PATH").map(PathBuf::from),
            log_filter: lookup("HOME_LOG").unwrap_or(defaults.log_filter),
        }
    }
}
