//! # Domain Errors
//!
//! Error types for the block store.
//!
//! - `Corrupted` is raised whenever on-disk bytes violate the block format.
//!   It always names the store and the block so the caller can decide to
//!   discard and rebuild the cache.
//! - `Io` wraps every failure of the underlying file operations.
//! - The remaining variants report caller bugs (contract violations).

use super::pointer::BlockPointer;
use super::state::StoreState;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by block stores and their locks.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Corrupted {pointer} found in {store}: {reason}")]
    Corrupted {
        store: String,
        pointer: BlockPointer,
        reason: CorruptionReason,
    },

    #[error("I/O error in {store}: {source}")]
    Io {
        store: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot {operation} {store}: store is {state}")]
    InvalidState {
        store: String,
        state: StoreState,
        operation: &'static str,
    },

    #[error("Cannot read the null block pointer from {store}")]
    NullPointer { store: String },

    #[error("Payload reported {reported} bytes but wrote {written} bytes to {store}")]
    PayloadSizeMismatch {
        store: String,
        reported: u32,
        written: u64,
    },

    #[error("Payload of {size} bytes exceeds the {max} byte limit of {store}")]
    PayloadTooLarge { store: String, size: u64, max: u32 },

    #[error("Payload for {pointer} in {store} grew from {allocated} to {requested} bytes")]
    BlockOverflow {
        store: String,
        pointer: BlockPointer,
        allocated: u32,
        requested: u32,
    },

    #[error("Timed out after {waited:?} waiting for lock on {}", .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("Lock error: {message}")]
    Lock { message: String },

    #[error("Some problems were found when checking the integrity of {store}: {message}")]
    Verification { store: String, message: String },
}

impl StoreError {
    /// Whether this error reports damaged on-disk data.
    ///
    /// The recovery for corruption is to discard the whole file and rebuild
    /// the cache; every other error leaves the file as it was.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::Corrupted { .. })
    }

    pub(crate) fn io(store: &str, source: io::Error) -> Self {
        StoreError::Io {
            store: store.to_string(),
            source,
        }
    }

    pub(crate) fn corrupted(store: &str, pointer: BlockPointer, reason: CorruptionReason) -> Self {
        StoreError::Corrupted {
            store: store.to_string(),
            pointer,
            reason,
        }
    }
}

/// Which structural or checksum invariant a block violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptionReason {
    #[error("file of {file_len} bytes ends before the block header")]
    Truncated { file_len: u64 },

    #[error("expected block marker {expected:#04x}, found {found:#04x}")]
    BadMarker { expected: u8, found: u8 },

    #[error("expected payload type {expected:#04x}, found {found:#04x}")]
    TypeMismatch { expected: u8, found: u8 },

    #[error("negative payload length {length}")]
    NegativeLength { length: i32 },

    #[error("payload length {length} runs past the end of the {file_len} byte file")]
    LengthOverrun { length: u32, file_len: u64 },

    #[error("checksum mismatch: stored {stored:#018x}, computed {computed:#018x}")]
    ChecksumMismatch { stored: u64, computed: u64 },

    #[error("payload could not be decoded: {message}")]
    Undecodable { message: String },

    #[error("payload left {remaining} of its bytes unread")]
    TrailingBytes { remaining: usize },
}
