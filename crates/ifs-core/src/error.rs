//! Error types for the IFS core.

use thiserror::Error;

/// Main error type for core data-model operations.
///
/// Most conditions described in the search algorithms (infeasible domains,
/// skipped neighbours, timeouts) are not represented here — they are logged
/// and the search continues. This type is reserved for conditions that
/// prevent a component from being constructed at all.
#[derive(Debug, Error)]
pub enum IfsError {
    /// Error in solver or component configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error in domain model definition (e.g. a variable with no domain
    /// where one was required, a dangling variable id).
    #[error("domain model error: {0}")]
    DomainModel(String),

    /// Solver was cancelled before completion.
    #[error("solver was cancelled")]
    Cancelled,

    /// Invalid operation for the current solver/assignment state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Internal error that should not occur in normal operation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, IfsError>;
