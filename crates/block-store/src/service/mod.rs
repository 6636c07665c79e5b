//! # Store Services
//!
//! Operations built purely on the block store contract.

mod verify;

pub use verify::{verify_blocks, VerificationReport};
