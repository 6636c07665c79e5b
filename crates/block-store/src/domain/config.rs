//! # Configuration
//!
//! Immutable configuration values for block stores and file locks.
//!
//! # Example
//!
//! ```ignore
//! use block_store::StoreConfig;
//!
//! let config = StoreConfig::default()
//!     .with_display_name("dependency resolution cache")
//!     .with_max_payload_size(64 * 1024 * 1024);
//! config.validate()?;
//! ```

use super::block::MAX_PAYLOAD_SIZE;
use super::errors::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a file-backed block store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Logical cache name used in errors and logs (default: the file path).
    pub display_name: Option<String>,

    /// Largest payload accepted by `write` (default: the format limit).
    pub max_payload_size: u32,

    /// Whether `flush` forces file data to disk (default: false).
    ///
    /// When `false`, `flush` is a no-op and durability is left to the OS.
    pub sync_on_flush: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            max_payload_size: MAX_PAYLOAD_SIZE,
            sync_on_flush: false,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Builder-style method to set the payload limit
    pub fn with_max_payload_size(mut self, max: u32) -> Self {
        self.max_payload_size = max;
        self
    }

    /// Builder-style method to force syncing on flush
    pub fn with_sync_on_flush(mut self, sync: bool) -> Self {
        self.sync_on_flush = sync;
        self
    }

    /// Name shown for a store backed by `path`.
    pub fn display_name_for(&self, path: &Path) -> String {
        match &self.display_name {
            Some(name) => format!("cache '{}'", name),
            None => format!("cache '{}'", path.display()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_payload_size > MAX_PAYLOAD_SIZE {
            return Err(StoreError::PayloadTooLarge {
                store: "configuration".to_string(),
                size: u64::from(self.max_payload_size),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(())
    }
}

/// Acquisition policy for [`FileLock`](crate::adapters::FileLock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Give up waiting for the lock after this long (default: 30s).
    pub timeout: Duration,

    /// First retry delay while the lock is contended (default: 50ms).
    pub initial_backoff: Duration,

    /// Retry delays double up to this cap (default: 500ms).
    pub max_backoff: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl LockConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }
}
