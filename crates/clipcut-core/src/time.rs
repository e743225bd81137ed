//! Time representation for clip editing
//!
//! Clip boundaries come from the analysis pipeline as seconds on the source
//! timeline, so everything here works in `f64` seconds. Clamping always
//! returns one of its inputs unchanged when it bites, which is what lets a
//! dragged edge land exactly on a neighbour's edge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A time span with inclusive start and exclusive end, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Start time (inclusive)
    pub start: f64,
    /// End time (exclusive)
    pub end: f64,
}

impl TimeSpan {
    /// Create a new span from start and end times.
    #[inline]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the span in seconds.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// True when `start < end` and both ends are finite.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start < self.end
    }

    /// Check if a time is within this span.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two spans overlap. Touching spans do not overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s–{:.3}s", self.start, self.end)
    }
}

/// Clamp `value` into `[lo, hi]`.
///
/// Unlike `f64::clamp` this never panics: an empty window (`lo > hi`)
/// resolves to `lo`.
#[inline]
pub fn clamp_time(value: f64, lo: f64, hi: f64) -> f64 {
    if value < lo || hi < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Format seconds as `MM:SS` for clip labels.
///
/// Minutes are not wrapped into hours, so 3725 s renders as `62:05`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
