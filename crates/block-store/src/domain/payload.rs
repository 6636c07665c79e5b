//! # Payload Capability
//!
//! The opaque, caller-defined content stored inside a block. The store only
//! relies on a payload's type tag, its self-reported size and its ability to
//! serialize itself; the tag exists purely to check that a read found the
//! kind of record the caller asked for.

use super::block::Block;
use super::codec::{Decoder, Encoder};
use super::pointer::BlockPointer;
use std::io;

/// A serializable unit stored in one block.
///
/// Payloads also carry their block bookkeeping, which is how repeated
/// writes of the same logical record find its address. Implementors keep an
/// `Option<Block>` field and expose it through [`block`](Self::block) and
/// [`set_block`](Self::set_block); only the store changes it.
pub trait BlockPayload {
    /// Caller-defined selector of payload kinds, passed to the factory on reads.
    type Kind: Copy + std::fmt::Debug;

    /// Small integer identifying this payload's kind on disk.
    fn type_tag(&self) -> u8;

    /// Exact number of bytes [`write_to`](Self::write_to) will produce.
    fn size(&self) -> u32;

    fn write_to(&self, encoder: &mut Encoder<'_>) -> io::Result<()>;

    /// Replace this payload's state with the bytes in `decoder`.
    fn read_from(&mut self, decoder: &mut Decoder<'_>) -> io::Result<()>;

    /// Block bookkeeping, `None` while detached from any store.
    fn block(&self) -> Option<Block>;

    fn set_block(&mut self, block: Option<Block>);

    /// Address of this payload's block, or null if it has none yet.
    fn pointer(&self) -> BlockPointer {
        self.block()
            .map(|block| block.pointer())
            .unwrap_or_default()
    }
}

/// Produces empty payload instances for reads.
pub trait PayloadFactory<P: BlockPayload> {
    fn create(&self, kind: P::Kind) -> P;
}

impl<P, F> PayloadFactory<P> for F
where
    P: BlockPayload,
    F: Fn(P::Kind) -> P,
{
    fn create(&self, kind: P::Kind) -> P {
        self(kind)
    }
}
