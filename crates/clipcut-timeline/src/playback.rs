//! Keeps the preview player and the timeline cursor in agreement.

use std::time::Instant;

use tracing::debug;

use crate::clip::{Clip, ClipId};
use crate::collection::ClipCollection;
use crate::drag::DragController;

/// Instruction for the preview player after a selection change.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSwap {
    pub clip_id: ClipId,
    /// Asset to load, if the clip has media
    pub asset: Option<String>,
    /// Offset into the asset to start from
    pub local_time: f64,
}

/// Result of a click on the timeline strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekOutcome {
    /// A drag or its debounce window swallowed the click.
    Ignored,
    /// Only the timeline cursor moved.
    CursorOnly { time: f64 },
    /// The cursor moved inside the selected clip; seek its asset to `local`.
    AssetSeek { time: f64, local: f64 },
}

/// Timeline cursor and preview selection state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSynchronizer {
    current_time: f64,
    selected_index: Option<usize>,
    preview_asset: Option<String>,
    last_local_seek: Option<f64>,
}

impl PlaybackSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the clip at `index`, moving the cursor to its edited start and
    /// swapping the preview asset in the same step.
    pub fn select_clip(
        &mut self,
        collection: &ClipCollection,
        index: usize,
    ) -> Option<PreviewSwap> {
        let clip = collection.get_index(index)?;
        self.selected_index = Some(index);
        self.current_time = clip.edited_start();
        self.preview_asset = clip.preview_asset().map(str::to_string);
        self.last_local_seek = Some(0.0);
        debug!(clip = %clip.id(), time = self.current_time, "Clip selected");

        Some(PreviewSwap {
            clip_id: clip.id().clone(),
            asset: self.preview_asset.clone(),
            local_time: 0.0,
        })
    }

    /// Select a clip by id.
    pub fn select_clip_by_id(
        &mut self,
        collection: &ClipCollection,
        id: &ClipId,
    ) -> Option<PreviewSwap> {
        let index = collection.position_of(id)?;
        self.select_clip(collection, index)
    }

    /// Map the preview player's local position onto the timeline.
    ///
    /// Uses the selected clip's current edited start, so a trim during
    /// playback is picked up on the next tick.
    pub fn on_preview_time_advance(&mut self, collection: &ClipCollection, local_time: f64) -> f64 {
        if let Some(clip) = self.selected_clip(collection) {
            self.current_time = clip.edited_start() + local_time.max(0.0);
        }
        self.current_time
    }

    /// Handle a click on the timeline strip at `position` (fraction of width).
    pub fn on_timeline_seek(
        &mut self,
        collection: &ClipCollection,
        drag: &DragController,
        position: f64,
        now: Instant,
    ) -> SeekOutcome {
        if drag.suppresses_seek(now) || !position.is_finite() {
            return SeekOutcome::Ignored;
        }
        let time = position.clamp(0.0, 1.0) * collection.timeline_duration();
        self.current_time = time;

        match self.selected_clip(collection) {
            Some(clip) if clip.edited_span().contains(time) => {
                let local = time - clip.edited_start();
                self.last_local_seek = Some(local);
                SeekOutcome::AssetSeek { time, local }
            }
            _ => SeekOutcome::CursorOnly { time },
        }
    }

    /// Re-read the selected clip's asset, e.g. after a caption swap.
    ///
    /// Returns the new asset when it changed.
    pub fn refresh_preview(&mut self, collection: &ClipCollection) -> Option<String> {
        let asset = self
            .selected_clip(collection)
            .and_then(Clip::preview_asset)
            .map(str::to_string);
        if asset == self.preview_asset {
            return None;
        }
        self.preview_asset = asset.clone();
        asset
    }

    /// The selected clip, if the index is still valid.
    pub fn selected_clip<'a>(&self, collection: &'a ClipCollection) -> Option<&'a Clip> {
        self.selected_index.and_then(|i| collection.get_index(i))
    }

    /// Forget selection and cursor.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn preview_asset(&self) -> Option<&str> {
        self.preview_asset.as_deref()
    }

    pub fn last_local_seek(&self) -> Option<f64> {
        self.last_local_seek
    }
}
