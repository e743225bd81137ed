//! Error types for ClipCut.

use thiserror::Error;

/// Main error type for ClipCut operations.
///
/// Subsystem crates keep their own detailed error enums and convert into
/// this one at crate boundaries.
#[derive(Error, Debug)]
pub enum ClipCutError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state transition: {0}")]
    Transition(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Caption error: {0}")]
    Caption(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Result type alias for ClipCut operations.
pub type Result<T> = std::result::Result<T, ClipCutError>;
