//! # Domain Layer
//!
//! Pure types of the block store. No file I/O happens here.
//!
//! ## Modules
//!
//! - `pointer` - Block addresses and the null sentinel
//! - `block` - Block layout constants, block bookkeeping, bump allocator
//! - `codec` - Big-endian encoder/decoder handed to payloads
//! - `payload` - The payload capability and payload factories
//! - `state` - Store lifecycle
//! - `config` - Store and lock configuration
//! - `errors` - Domain error types

pub mod block;
pub mod codec;
pub mod config;
pub mod errors;
pub mod payload;
pub mod pointer;
pub mod state;

pub use block::{Allocator, Block, BLOCK_MARKER, HEADER_SIZE, MAX_PAYLOAD_SIZE, TRAILER_SIZE};
pub use codec::{Decoder, Encoder};
pub use config::{LockConfig, StoreConfig};
pub use errors::{CorruptionReason, Result, StoreError};
pub use payload::{BlockPayload, PayloadFactory};
pub use pointer::BlockPointer;
pub use state::StoreState;
