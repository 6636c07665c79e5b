//! Store lifecycle: `Unopened -> Open -> Closed`.

use std::fmt;

/// Lifecycle state of a block store. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreState {
    #[default]
    Unopened,
    Open,
    Closed,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreState::Unopened => "unopened",
            StoreState::Open => "open",
            StoreState::Closed => "closed",
        };
        f.write_str(name)
    }
}
