//! # Ports
//!
//! - `inbound` - The block store contract implemented by every store
//! - `outbound` - The exclusive lock the locking decorator depends on

pub mod inbound;
pub mod outbound;

pub use inbound::{BlockStore, Initializer};
pub use outbound::ExclusiveLock;
