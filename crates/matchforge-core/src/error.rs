//! Error types for MatchForge

use thiserror::Error;

/// Main error type for MatchForge operations
///
/// Every payload is owned and cloneable so that a single failure can be handed
/// to all the waiters of a shared task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchForgeError {
    /// Error in matching configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mandatory suppliers were not set before building
    #[error("Some mandatory suppliers are missing: {}", .0.join(", "))]
    MissingSuppliers(Vec<&'static str>),

    /// A criterion broke the cost invariants (negative score or overflow)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A pair evaluated directly fails a necessary criterion
    #[error("Infeasible pair: {0}")]
    InfeasiblePair(String),

    /// Task submitted to an executor that has been shut down
    #[error("Task rejected: {0}")]
    RejectedSubmission(String),

    /// A task or a wait was interrupted before completion
    #[error("Interrupted: {0}")]
    Interrupted(String),

    /// A submitted task panicked
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for MatchForge operations
pub type Result<T> = std::result::Result<T, MatchForgeError>;
