//! # File Lock Implementation
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFileEx on
//! Windows) on a lock file kept next to the cache file.
//!
//! OS file locks belong to the open file description, so threads sharing
//! one `FileLock` would not exclude each other through the OS lock alone.
//! An in-process mutex serializes them first.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use fs2::FileExt;
use parking_lot::Mutex;

use crate::domain::{LockConfig, Result, StoreError};
use crate::ports::ExclusiveLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Cross-process lock on a lock file.
///
/// # Example
///
/// ```ignore
/// let lock = Arc::new(FileLock::for_cache_file(&cache_path, LockConfig::default())?);
/// let mut store = LockingBlockStore::new(FileBackedBlockStore::new(&cache_path, config), lock);
/// ```
pub struct FileLock {
    /// The lock file handle, guarded for in-process exclusion
    file: Mutex<File>,
    /// Path to the lock file
    path: PathBuf,
    config: LockConfig,
}

impl FileLock {
    /// Open (creating if absent) the lock file at `path`.
    pub fn open<T: AsRef<Path>>(path: T, config: LockConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::Lock {
                message: format!("Failed to create lock file {}: {}", path.display(), e),
            })?;

        Ok(Self {
            file: Mutex::new(file),
            path,
            config,
        })
    }

    /// Lock guarding the cache file at `cache_path`, kept beside it with
    /// `.lock` appended to its full file name.
    pub fn for_cache_file<T: AsRef<Path>>(cache_path: T, config: LockConfig) -> Result<Self> {
        let cache_path = cache_path.as_ref();
        let name = cache_path.file_name().ok_or_else(|| StoreError::Lock {
            message: format!("Cache path {} has no file name", cache_path.display()),
        })?;
        let mut lock_name = name.to_os_string();
        lock_name.push(".lock");
        Self::open(cache_path.with_file_name(lock_name), config)
    }

    /// Get the path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    fn run<T, F>(&self, mode: LockMode, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let file = self.file.lock();
        self.acquire(&*file, mode)?;
        let _release = Release { file: &*file };
        action()
    }

    /// Take the OS lock, retrying with exponential backoff until the
    /// configured timeout. A timeout too large to represent never expires.
    fn acquire(&self, file: &File, mode: LockMode) -> Result<()> {
        let started = Instant::now();
        let deadline = started.checked_add(self.config.timeout);
        let mut retry_delay = self.config.initial_backoff;

        loop {
            let attempt = match mode {
                LockMode::Shared => FileExt::try_lock_shared(file),
                LockMode::Exclusive => FileExt::try_lock_exclusive(file),
            };

            match attempt {
                Ok(()) => {
                    #[cfg(feature = "tracing-log")]
                    tracing::debug!(
                        "[block-store] 🔒 Acquired {:?} lock on {} after {:?}",
                        mode,
                        self.path.display(),
                        started.elapsed()
                    );
                    return Ok(());
                }
                Err(e) if is_contended(&e) => {
                    let now = Instant::now();
                    let mut delay = retry_delay;
                    if let Some(deadline) = deadline {
                        if now >= deadline {
                            return Err(StoreError::LockTimeout {
                                path: self.path.clone(),
                                waited: now - started,
                            });
                        }
                        delay = delay.min(deadline - now);
                    }
                    thread::sleep(delay);
                    retry_delay = retry_delay.saturating_mul(2).min(self.config.max_backoff);
                }
                Err(e) => {
                    return Err(StoreError::Lock {
                        message: format!("Failed to lock {}: {}", self.path.display(), e),
                    })
                }
            }
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Releases the OS lock when the action finishes, even on panic.
struct Release<'a> {
    file: &'a File,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let _ = FileExt::unlock(self.file);
    }
}

impl ExclusiveLock for FileLock {
    fn run_with_write_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.run(LockMode::Exclusive, action)
    }

    fn run_with_read_access<T, F>(&self, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.run(LockMode::Shared, action)
    }
}

impl std::fmt::Debug for FileLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLock")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish()
    }
}
