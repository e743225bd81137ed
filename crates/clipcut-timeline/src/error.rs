//! Validation errors for upstream clip records and local edits.

use clipcut_core::ClipCutError;
use thiserror::Error;

use crate::clip::ClipId;

/// A clip record or edit request that failed local validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The record at `index` is not a JSON object.
    #[error("Clip record #{index} is not an object")]
    NotAnObject { index: usize },

    /// The record at `index` has no usable id.
    #[error("Clip record #{index} has no id")]
    MissingId { index: usize },

    /// A required time bound is absent.
    #[error("Clip {id} is missing {field}")]
    MissingTime { id: ClipId, field: &'static str },

    /// A time bound is present but not a finite number.
    #[error("Clip {id} has a non-numeric {field}")]
    NonNumericTime { id: ClipId, field: &'static str },

    /// Start lies before the beginning of the timeline.
    #[error("Clip {id} starts before zero ({start})")]
    NegativeStart { id: ClipId, start: f64 },

    /// `start >= end`.
    #[error("Clip {id} has an empty span ({start} >= {end})")]
    EmptySpan { id: ClipId, start: f64, end: f64 },

    /// End lies past the timeline duration.
    #[error("Clip {id} ends at {end}, past the timeline duration {duration}")]
    BeyondTimeline { id: ClipId, end: f64, duration: f64 },

    /// A caption segment falls outside its clip's edited duration.
    #[error("Clip {id} has caption #{index} outside its duration")]
    CaptionOutOfRange { id: ClipId, index: usize },

    /// Two records share an id.
    #[error("Duplicate clip id {id}")]
    DuplicateId { id: ClipId },

    /// Two clips cover the same stretch of the timeline.
    #[error("Clips {first} and {second} overlap")]
    Overlap { first: ClipId, second: ClipId },

    /// The supplied timeline duration is not a positive number.
    #[error("Invalid timeline duration {duration}")]
    InvalidTimeline { duration: f64 },
}

impl From<ValidationError> for ClipCutError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
