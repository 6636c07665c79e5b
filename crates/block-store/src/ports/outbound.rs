//! # Outbound Port
//!
//! The externally supplied mutual-exclusion primitive.

use crate::domain::Result;
use std::sync::Arc;

/// Whole-file lock offering read and write transactions.
///
/// Write transactions exclude every other transaction. Whether read
/// transactions may overlap each other is up to the implementation.
pub trait ExclusiveLock {
    /// Run `action` while holding write access.
    fn run_with_write_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>;

    /// Run `action` while holding read access.
    fn run_with_read_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>;
}

impl<L: ExclusiveLock> ExclusiveLock for Arc<L> {
    fn run_with_write_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        (**self).run_with_write_access(action)
    }

    fn run_with_read_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        (**self).run_with_read_access(action)
    }
}
