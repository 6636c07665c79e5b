//! # Inbound Port
//!
//! The block storage contract. `FileBackedBlockStore` is always the innermost
//! implementation; `LockingBlockStore` layers on top of it when the backing
//! file is shared between lock holders.

use crate::domain::{BlockPayload, BlockPointer, PayloadFactory, Result, StoreState};

/// Seeds an empty store on open.
///
/// Receives the innermost store, so writes made here bypass any decorator
/// that is already running the initializer inside its own transaction.
pub type Initializer<'a, P> =
    Box<dyn FnOnce(&mut dyn BlockStore<Payload = P>) -> Result<()> + 'a>;

/// Durable, addressable block primitive.
///
/// All operations other than `open` require the store to be `Open`.
pub trait BlockStore {
    type Payload: BlockPayload;

    /// Name identifying the logical cache in errors.
    fn display_name(&self) -> &str;

    fn state(&self) -> StoreState;

    /// Open (creating if absent) the backing file.
    ///
    /// `initializer` runs only when the file is empty. `factory` produces the
    /// empty payloads that reads deserialize into.
    fn open(
        &mut self,
        initializer: Initializer<'_, Self::Payload>,
        factory: Box<dyn PayloadFactory<Self::Payload> + Send>,
    ) -> Result<()>;

    /// Release the file handle. Terminal.
    fn close(&mut self) -> Result<()>;

    /// Truncate the file to empty and reset allocation.
    fn clear(&mut self) -> Result<()>;

    /// Durability hint.
    fn flush(&mut self) -> Result<()>;

    /// Give a detached payload an unallocated block. No file I/O.
    fn attach(&mut self, payload: &mut Self::Payload) -> Result<()>;

    /// Detach a payload from its block. File space is not reclaimed.
    fn remove(&mut self, payload: &mut Self::Payload) -> Result<()>;

    /// Materialize a payload of `kind` from the block at `pointer`.
    fn read(
        &mut self,
        pointer: BlockPointer,
        kind: <Self::Payload as BlockPayload>::Kind,
    ) -> Result<Self::Payload>;

    /// Read the root block at offset 0.
    fn read_first(
        &mut self,
        kind: <Self::Payload as BlockPayload>::Kind,
    ) -> Result<Self::Payload> {
        self.read(BlockPointer::first(), kind)
    }

    /// Serialize the payload to its block, allocating the block on first write.
    ///
    /// Returns the block's pointer.
    fn write(&mut self, payload: &mut Self::Payload) -> Result<BlockPointer>;
}
