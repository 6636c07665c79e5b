//! # Locking Block Store
//!
//! Decorator that runs every file-touching operation of an inner store
//! inside a transaction of an [`ExclusiveLock`]. Reads take read access;
//! writes, removals, clears and flushes take write access. The initializer
//! passed to `open` runs under write access so seeding an empty file is
//! atomic with respect to other lock holders.
//!
//! Several stores over the same file (in one process or many) are safe as
//! long as all of them go through this decorator with a lock guarding the
//! same file.

use crate::domain::{BlockPayload, BlockPointer, PayloadFactory, Result, StoreState};
use crate::ports::{BlockStore, ExclusiveLock, Initializer};

pub struct LockingBlockStore<S, L> {
    store: S,
    lock: L,
}

impl<S, L> LockingBlockStore<S, L>
where
    S: BlockStore,
    L: ExclusiveLock,
{
    pub fn new(store: S, lock: L) -> Self {
        Self { store, lock }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }

    pub fn into_inner(self) -> (S, L) {
        (self.store, self.lock)
    }
}

impl<S, L> BlockStore for LockingBlockStore<S, L>
where
    S: BlockStore,
    L: ExclusiveLock,
{
    type Payload = S::Payload;

    fn display_name(&self) -> &str {
        self.store.display_name()
    }

    fn state(&self) -> StoreState {
        self.store.state()
    }

    fn open(
        &mut self,
        initializer: Initializer<'_, S::Payload>,
        factory: Box<dyn PayloadFactory<S::Payload> + Send>,
    ) -> Result<()> {
        let lock = &self.lock;
        self.store.open(
            Box::new(move |store: &mut dyn BlockStore<Payload = S::Payload>| {
                lock.run_with_write_access(move || initializer(store))
            }),
            factory,
        )
    }

    fn close(&mut self) -> Result<()> {
        self.store.close()
    }

    fn clear(&mut self) -> Result<()> {
        self.lock.run_with_write_access(|| self.store.clear())
    }

    fn flush(&mut self) -> Result<()> {
        self.lock.run_with_write_access(|| self.store.flush())
    }

    fn attach(&mut self, payload: &mut S::Payload) -> Result<()> {
        self.store.attach(payload)
    }

    fn remove(&mut self, payload: &mut S::Payload) -> Result<()> {
        self.lock
            .run_with_write_access(|| self.store.remove(payload))
    }

    fn read(
        &mut self,
        pointer: BlockPointer,
        kind: <S::Payload as BlockPayload>::Kind,
    ) -> Result<S::Payload> {
        self.lock
            .run_with_read_access(|| self.store.read(pointer, kind))
    }

    fn read_first(&mut self, kind: <S::Payload as BlockPayload>::Kind) -> Result<S::Payload> {
        self.lock
            .run_with_read_access(|| self.store.read_first(kind))
    }

    fn write(&mut self, payload: &mut S::Payload) -> Result<BlockPointer> {
        self.lock
            .run_with_write_access(|| self.store.write(payload))
    }
}
