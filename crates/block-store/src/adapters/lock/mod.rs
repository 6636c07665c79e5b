//! # Exclusive Lock Implementations
//!
//! ## Modules
//!
//! - `process`: ProcessLock for stores shared between threads of one process
//! - `flock`: FileLock using fs2, for stores shared between processes

#[cfg(feature = "file-lock")]
mod flock;
mod process;

#[cfg(feature = "file-lock")]
pub use flock::FileLock;
pub use process::ProcessLock;
