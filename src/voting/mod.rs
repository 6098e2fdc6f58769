pub mod engine;
pub mod results;
pub mod selection;
pub mod tally;

pub use engine::VoteSimulationEngine;
pub use tally::VoteTally;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("no candidate is selected")]
    NoSelection,
    #[error("this client has already voted")]
    AlreadyVoted,
}

/// Whether an accepted vote reached the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Persisted,
    /// Counted in memory only; lost on the next start.
    SessionOnly,
}
