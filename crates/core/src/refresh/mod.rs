//! Token refresh coordination

mod coordinator;
mod state;

pub use coordinator::RefreshCoordinator;
pub use state::{RefreshOutcome, RefreshPhase};
