//! ClipCut Timeline - Interactive clip editing model
//!
//! Implements the editable side of a clip-extraction job:
//! - Clips with immutable provenance and mutable edited bounds
//! - A collection that keeps edited intervals non-overlapping
//! - Pointer-drag trimming and moving with neighbour clamping
//! - Playback position sync between the preview asset and the timeline

pub mod clip;
pub mod collection;
pub mod drag;
pub mod error;
pub mod playback;

pub use clip::{
    CaptionAnimation, CaptionPosition, CaptionSegment, CaptionStyle, Clip, ClipId, MediaRef,
    fit_captions,
};
pub use collection::{ClipCollection, RawClip};
pub use drag::{
    hit_test, DragController, DragMode, DragSession, DragZone, ListenerRegistration,
    PointerListeners, PressOutcome, TimelineGeometry,
};
pub use error::ValidationError;
pub use playback::{PlaybackSynchronizer, PreviewSwap, SeekOutcome};
