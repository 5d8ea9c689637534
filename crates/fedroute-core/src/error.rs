//! Error types for routing operations.

use thiserror::Error;

/// Errors surfaced by the router and its stores.
///
/// Routing itself degrades through tiers rather than failing: data problems
/// (missing index, unreachable provider, corrupt cache) are encoded in the
/// `method` string of a successful result. Only invalid input and failed
/// mutations reach the caller as errors.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for routing operations.
pub type Result<T> = std::result::Result<T, RouteError>;
