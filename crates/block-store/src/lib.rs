//! # Block Store
//!
//! Checksummed, append-growing block storage engine for on-disk persistent
//! caches. A single flat file holds a sequence of self-describing blocks;
//! each block is addressed by a [`BlockPointer`] (its byte offset) and
//! validated with a CRC32 trailer on every read.
//!
//! ## Block Layout
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | marker | 1 | Always `0xCC` |
//! | type | 1 | Payload type tag |
//! | length | 4 | Payload length, signed big-endian |
//! | payload | length | Caller-defined bytes |
//! | checksum | 8 | CRC32 of everything before it, big-endian |
//!
//! ## Guarantees
//!
//! | Property | Description |
//! |----------|-------------|
//! | Integrity | Any damaged, truncated or mistyped block is reported as corruption |
//! | Stable addresses | A block's pointer never changes once allocated |
//! | Monotonic allocation | New blocks never overlap existing ones |
//! | Mutual exclusion | Writes through `LockingBlockStore` never interleave |
//!
//! There is no multi-block atomicity and space is never reclaimed. On
//! corruption the expected recovery is to discard the file and rebuild.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pointers, blocks, allocation, codec, errors, configuration
//! - `ports/` - The block store contract and the exclusive lock capability
//! - `adapters/` - File-backed store, locking decorator, lock implementations
//! - `service/` - Integrity verification over the store contract
//!
//! ## Usage
//!
//! ```ignore
//! use block_store::{FileBackedBlockStore, LockingBlockStore, ProcessLock, StoreConfig};
//!
//! let inner = FileBackedBlockStore::new(&path, StoreConfig::default());
//! let mut store = LockingBlockStore::new(inner, Arc::new(ProcessLock::new()));
//! store.open(Box::new(|store| store.write(&mut Root::new()).map(|_| ())), factory)?;
//!
//! let root = store.read_first(Kind::Root)?;
//! let pointer = store.write(&mut record)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;


// Re-export key types for convenience
pub use adapters::{FileBackedBlockStore, LockingBlockStore, ProcessLock};
pub use domain::{
    Block, BlockPayload, BlockPointer, CorruptionReason, Decoder, Encoder, LockConfig,
    PayloadFactory, Result, StoreConfig, StoreError, StoreState, BLOCK_MARKER, HEADER_SIZE,
    MAX_PAYLOAD_SIZE, TRAILER_SIZE,
};
pub use ports::{BlockStore, ExclusiveLock, Initializer};
pub use service::{verify_blocks, VerificationReport};

#[cfg(feature = "file-lock")]
pub use adapters::FileLock;
