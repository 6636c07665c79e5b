//! # Blocks and Allocation
//!
//! On-disk layout of a single block, in order:
//!
//! ```text
//! +--------+------+----------+-------------------+----------+
//! | marker | type |  length  |      payload      |  crc32   |
//! |  0xCC  | (u8) | (i32 BE) |  (length bytes)   | (i64 BE) |
//! +--------+------+----------+-------------------+----------+
//! ```
//!
//! The checksum covers every byte before it. Blocks are handed out by a bump
//! allocator over a single growable file; space is never reclaimed.

use super::pointer::BlockPointer;

/// Format guard written as the first byte of every block.
pub const BLOCK_MARKER: u8 = 0xCC;

/// Marker, type tag and payload length.
pub const HEADER_SIZE: u64 = 1 + 1 + 4;

/// CRC32 widened to eight bytes.
pub const TRAILER_SIZE: u64 = 8;

/// Largest payload the 4-byte signed length field can describe.
pub const MAX_PAYLOAD_SIZE: u32 = i32::MAX as u32;

/// The block bookkeeping carried by an attached payload.
///
/// An attached payload starts out `Unallocated`; its first write turns it
/// into `Allocated`, after which the pointer never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// Attached to a store but not yet given an address.
    Unallocated,
    /// Stored at `pointer`, with room for `payload_size` payload bytes.
    Allocated {
        pointer: BlockPointer,
        payload_size: u32,
    },
}

impl Block {
    /// Size on disk of a block holding `payload_size` payload bytes.
    pub const fn total_size(payload_size: u32) -> u64 {
        payload_size as u64 + HEADER_SIZE + TRAILER_SIZE
    }

    /// The block's address, or the null pointer while unallocated.
    pub fn pointer(&self) -> BlockPointer {
        match self {
            Block::Unallocated => BlockPointer::null(),
            Block::Allocated { pointer, .. } => *pointer,
        }
    }

    pub fn is_allocated(&self) -> bool {
        matches!(self, Block::Allocated { .. })
    }

    /// Byte range `[start, end)` this block occupies, if allocated.
    pub fn extent(&self) -> Option<(u64, u64)> {
        match self {
            Block::Unallocated => None,
            Block::Allocated {
                pointer,
                payload_size,
            } => pointer
                .offset()
                .map(|start| (start, start + Self::total_size(*payload_size))),
        }
    }
}

/// Monotonic bump allocator state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Allocator {
    next: u64,
}

impl Allocator {
    /// Allocator whose next block starts at `next`.
    pub const fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Offset the next block will be placed at.
    pub const fn next(&self) -> u64 {
        self.next
    }

    /// Hand out room for a block with `payload_size` payload bytes.
    pub fn allocate(self, payload_size: u32) -> (Allocator, BlockPointer) {
        let pointer = BlockPointer::at(self.next as i64);
        let next = self.next + Block::total_size(payload_size);
        (Allocator { next }, pointer)
    }

    /// Account for a file that grew behind this allocator's back.
    ///
    /// Never moves the allocator backwards.
    pub fn observe(self, file_len: u64) -> Allocator {
        Allocator {
            next: self.next.max(file_len),
        }
    }

    pub const fn reset() -> Allocator {
        Allocator { next: 0 }
    }
}
