//! ClipCut Captions - Caption generation, styling and burn-in per clip
//!
//! Provides:
//! - The per-clip caption workflow (generate → style → edit → apply)
//! - Demonstration captions used when generation is unavailable
//! - Style validation
//! - Word-by-word expansion and SubRip export

pub mod error;
pub mod fallback;
pub mod style;
pub mod subtitles;
pub mod workflow;

pub use error::{CaptionError, CaptionResult};
pub use fallback::demo_captions;
pub use style::{is_hex_color, validate_style};
pub use subtitles::{format_srt_time, render_srt, split_word_by_word};
pub use workflow::{normalize_segments, ApplyOutcome, CaptionStage, CaptionWorkflow, GenerateOutcome};
