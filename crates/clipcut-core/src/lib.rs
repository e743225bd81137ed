//! ClipCut Core - Foundation types for clip editing
//!
//! This crate provides the fundamental types used throughout ClipCut:
//! - Time spans and timestamp formatting (seconds on the source timeline)
//! - The shared error type
//! - Editor configuration
//! - Editing constants (minimum clip length, debounce and poll cadence)

pub mod config;
pub mod error;
pub mod time;

pub use config::EditorConfig;
pub use error::{ClipCutError, Result};
pub use time::{clamp_time, format_timestamp, TimeSpan};

/// Editing policy constants.
pub mod editing {
    use std::time::Duration;

    /// Shortest span a clip may be trimmed to, in seconds.
    pub const MIN_CLIP_LENGTH: f64 = 1.0;

    /// Window after a drag release during which timeline seeks are ignored.
    pub const SEEK_DEBOUNCE: Duration = Duration::from_millis(150);

    /// Cadence of job status polling while a job is processing.
    pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

    /// Width of the grab zone at each clip edge, in pixels.
    pub const EDGE_HANDLE_PX: f64 = 8.0;
}
