//! Caption workflow errors.

use clipcut_core::ClipCutError;
use clipcut_timeline::ClipId;
use thiserror::Error;

pub type CaptionResult<T> = Result<T, CaptionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptionError {
    /// Rejected locally before any network call.
    #[error("Invalid caption input: {0}")]
    Validation(String),

    #[error("Caption segment {index} out of range ({len} segments)")]
    SegmentOutOfRange { index: usize, len: usize },

    #[error("Unknown clip {0}")]
    UnknownClip(ClipId),
}

impl From<CaptionError> for ClipCutError {
    fn from(err: CaptionError) -> Self {
        ClipCutError::Caption(err.to_string())
    }
}
