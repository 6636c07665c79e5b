//! # Block Pointer
//!
//! Offset-based address of a block inside the backing file.
//!
//! A pointer is a bare coordinate: it holds no file handle and is never
//! validated against an actual file. Negative positions all collapse onto the
//! single null sentinel, so a null pointer always equals another null pointer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a block, or the null pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockPointer {
    position: i64,
}

impl BlockPointer {
    /// Position used for the null pointer.
    pub const NULL_POSITION: i64 = -1;

    /// The pointer that refers to no block.
    pub const fn null() -> Self {
        Self {
            position: Self::NULL_POSITION,
        }
    }

    /// Pointer to the block starting at `position`.
    ///
    /// Any negative position yields the null pointer.
    pub const fn at(position: i64) -> Self {
        if position < 0 {
            Self::null()
        } else {
            Self { position }
        }
    }

    /// Pointer to the conventional root block at offset 0.
    pub const fn first() -> Self {
        Self { position: 0 }
    }

    pub const fn is_null(&self) -> bool {
        self.position < 0
    }

    /// Raw byte offset. Only meaningful when the pointer is not null.
    pub const fn position(&self) -> i64 {
        self.position
    }

    /// Offset as an unsigned file position, or `None` for the null pointer.
    pub fn offset(&self) -> Option<u64> {
        u64::try_from(self.position).ok()
    }
}

impl Default for BlockPointer {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for BlockPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null block")
        } else {
            write!(f, "block {}", self.position)
        }
    }
}
