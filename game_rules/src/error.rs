//! Error types for game_rules.

use thiserror::Error;

/// Result type alias using game_rules' error type.
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors raised when moving session state in or out of the crate.
#[derive(Debug, Error)]
pub enum StateError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
