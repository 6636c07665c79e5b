//! # Adapters Module
//!
//! Concrete implementations of the ports.
//!
//! ## Modules
//!
//! - `checksum`: CRC32 accumulators for block trailers
//! - `file_store`: FileBackedBlockStore, the file-backed engine
//! - `locking`: LockingBlockStore, the lock decorator
//! - `lock`: ExclusiveLock implementations (in-process and file lock)

pub mod checksum;
pub mod file_store;
pub mod lock;
pub mod locking;

pub use file_store::FileBackedBlockStore;
#[cfg(feature = "file-lock")]
pub use lock::FileLock;
pub use lock::ProcessLock;
pub use locking::LockingBlockStore;
