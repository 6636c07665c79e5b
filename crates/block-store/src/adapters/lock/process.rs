//! In-process lock: shared read transactions, exclusive write transactions.

use crate::domain::Result;
use crate::ports::ExclusiveLock;
use parking_lot::RwLock;

/// Lock for stores whose holders all live in the current process.
///
/// Share it between stores with an `Arc`.
#[derive(Debug, Default)]
pub struct ProcessLock {
    lock: RwLock<()>,
}

impl ProcessLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExclusiveLock for ProcessLock {
    fn run_with_write_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let _guard = self.lock.write();
        action()
    }

    fn run_with_read_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let _guard = self.lock.read();
        action()
    }
}
