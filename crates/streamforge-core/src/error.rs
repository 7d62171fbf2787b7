//! Error types for StreamForge

use thiserror::Error;

/// Main error type for StreamForge operations
#[derive(Debug, Error)]
pub enum StreamForgeError {
    /// Invalid stream graph construction (unknown source type, cross-factory
    /// stream misuse, invalid grouping shape, duplicate constraint name).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error in the domain model consulted by a session
    #[error("Domain model error: {0}")]
    DomainModel(String),

    /// A declaration was shared or extended in a way that would corrupt
    /// already canonical ancestors.
    #[error("Node sharing violation: {0}")]
    SharingViolation(String),

    /// A fact was updated or retracted without having been inserted.
    #[error("Unknown fact: {0}")]
    UnknownFact(String),

    /// A fact with the same identity is already in working memory.
    #[error("Duplicate fact: {0}")]
    DuplicateFact(String),

    /// A user-supplied predicate, mapping, collector or weigher panicked.
    #[error("{operation} failed for constraints {constraints:?} on {fact}: {message}")]
    Evaluation {
        /// The external call and the node operation that was evaluating.
        operation: String,
        /// Full names of the constraints that own the failing node.
        constraints: Vec<String>,
        /// Debug rendering of the offending tuple or fact.
        fact: String,
        /// The panic message.
        message: String,
    },

    /// An earlier evaluation failure left the session partially propagated.
    #[error("Session is poisoned by an earlier evaluation failure and must be rebuilt")]
    Poisoned,

    /// Constraint matches were requested from a session built without match tracking.
    #[error("Constraint match tracking is disabled for this session")]
    MatchTrackingDisabled,

    /// The incremental score diverged from a from-scratch recalculation.
    #[error("Score corruption: incremental score {incremental} differs from rebuilt score {expected}")]
    ScoreCorruption {
        incremental: String,
        expected: String,
    },

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for StreamForge operations
pub type Result<T> = std::result::Result<T, StreamForgeError>;
