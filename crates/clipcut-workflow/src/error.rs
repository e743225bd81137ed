//! Workflow error types.

use clipcut_captions::CaptionError;
use clipcut_core::ClipCutError;
use clipcut_timeline::ClipId;
use thiserror::Error;

use crate::job::JobPhase;

/// An action was requested from a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot {action} while job is {from}")]
pub struct TransitionError {
    pub from: JobPhase,
    pub action: &'static str,
}

impl TransitionError {
    pub fn new(from: JobPhase, action: &'static str) -> Self {
        Self { from, action }
    }
}

/// Why a finalize did not produce output clips.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinalizeError {
    /// The service answered with a non-success status.
    #[error("{0}")]
    Rejected(String),

    /// The call itself failed.
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Caption(#[from] CaptionError),

    #[error("Unknown clip {0}")]
    UnknownClip(ClipId),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl From<TransitionError> for ClipCutError {
    fn from(err: TransitionError) -> Self {
        ClipCutError::Transition(err.to_string())
    }
}

impl From<SessionError> for ClipCutError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Transition(e) => e.into(),
            SessionError::Caption(e) => e.into(),
            SessionError::UnknownClip(id) => ClipCutError::NotFound(format!("clip {id}")),
        }
    }
}
