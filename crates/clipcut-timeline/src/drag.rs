//! Pointer-drag interaction for timeline clips.
//!
//! A gesture is press → moves → release on exactly one clip. The active
//! gesture lives in a [`DragSession`] owned by the [`DragController`]; its
//! global move/release listeners are held as a [`ListenerRegistration`] and
//! detached when the session is dropped.

use std::time::{Duration, Instant};

use clipcut_core::{clamp_time, editing};
use tracing::debug;

use crate::clip::ClipId;
use crate::collection::ClipCollection;

// ── Geometry ────────────────────────────────────────────────────

/// Linear mapping between the visible timeline strip and timeline seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineGeometry {
    /// Visible width of the timeline in pixels
    pub width_px: f64,
    /// Timeline duration in seconds
    pub duration: f64,
}

impl TimelineGeometry {
    pub fn new(width_px: f64, duration: f64) -> Self {
        Self { width_px, duration }
    }

    /// Convert a pixel delta into a time delta.
    pub fn px_to_seconds(&self, delta_px: f64) -> f64 {
        if self.width_px <= 0.0 {
            return 0.0;
        }
        delta_px / self.width_px * self.duration
    }

    /// Convert a timeline time into a pixel offset from the left edge.
    pub fn seconds_to_px(&self, seconds: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        seconds / self.duration * self.width_px
    }
}

// ── Hit testing ─────────────────────────────────────────────────

/// Which part of a clip the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragZone {
    LeftEdge,
    RightEdge,
    Body,
}

/// What a drag gesture manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Move the start boundary.
    TrimStart,
    /// Move the end boundary.
    TrimEnd,
    /// Shift the whole clip, preserving its duration.
    Move,
}

impl From<DragZone> for DragMode {
    fn from(zone: DragZone) -> Self {
        match zone {
            DragZone::LeftEdge => DragMode::TrimStart,
            DragZone::RightEdge => DragMode::TrimEnd,
            DragZone::Body => DragMode::Move,
        }
    }
}

/// Hit test a pointer x offset against the clips on the timeline.
///
/// Edge handles are `handle_px` wide inside each clip; on clips narrower
/// than two handles the nearer edge wins.
pub fn hit_test(
    collection: &ClipCollection,
    geometry: &TimelineGeometry,
    x: f64,
    handle_px: f64,
) -> Option<(ClipId, DragZone)> {
    collection.iter().find_map(|clip| {
        let left = geometry.seconds_to_px(clip.edited_start());
        let right = geometry.seconds_to_px(clip.edited_end());
        if x < left || x > right {
            return None;
        }
        let zone = if right - left < handle_px * 2.0 {
            if x - left <= right - x {
                DragZone::LeftEdge
            } else {
                DragZone::RightEdge
            }
        } else if x - left <= handle_px {
            DragZone::LeftEdge
        } else if right - x <= handle_px {
            DragZone::RightEdge
        } else {
            DragZone::Body
        };
        Some((clip.id().clone(), zone))
    })
}

// ── Listener scope ──────────────────────────────────────────────

/// Host for the global pointer-move/release listeners a drag installs.
pub trait PointerListeners {
    /// Attach the listeners; they stay attached until the returned
    /// registration is dropped.
    fn attach(&self) -> ListenerRegistration;
}

/// Scoped ownership of attached pointer listeners.
///
/// Dropping the registration runs the detach callback exactly once.
#[must_use = "listeners are detached as soon as the registration is dropped"]
pub struct ListenerRegistration {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    /// Create a registration that runs `detach` when dropped.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A registration with nothing to detach (headless use).
    pub fn noop() -> Self {
        Self { detach: None }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

// ── Drag session ────────────────────────────────────────────────

/// State of one in-progress gesture.
#[derive(Debug)]
pub struct DragSession {
    pub mode: DragMode,
    pub clip_id: ClipId,
    /// Boundary value (start for trim-start/move, end for trim-end) at press
    pub reference_value: f64,
    /// Pointer x at press, in pixels
    pub reference_pointer_x: f64,
    _listeners: ListenerRegistration,
}

/// Result of a pointer press on a clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    /// A drag gesture started on the selected clip.
    Started(DragMode),
    /// The press landed on a non-selected clip; select it instead.
    Select(ClipId),
    /// Nothing to do (unknown clip, or a gesture is already active).
    Ignored,
}

/// Translates pointer gestures into boundary edits on one clip at a time.
#[derive(Debug)]
pub struct DragController {
    session: Option<DragSession>,
    suppress_seek_until: Option<Instant>,
    debounce: Duration,
    min_clip_length: f64,
}

impl DragController {
    /// Create a controller with the given seek debounce and minimum clip length.
    pub fn new(debounce: Duration, min_clip_length: f64) -> Self {
        Self {
            session: None,
            suppress_seek_until: None,
            debounce,
            min_clip_length,
        }
    }

    /// Handle a pointer press on `clip_id`.
    ///
    /// Only the selected clip can be dragged; a press anywhere on another
    /// clip asks for selection and never starts a drag.
    pub fn press(
        &mut self,
        collection: &ClipCollection,
        clip_id: &ClipId,
        zone: DragZone,
        pointer_x: f64,
        selected: Option<&ClipId>,
        listeners: &dyn PointerListeners,
    ) -> PressOutcome {
        if self.session.is_some() {
            return PressOutcome::Ignored;
        }
        let Some(clip) = collection.get(clip_id) else {
            return PressOutcome::Ignored;
        };
        if selected != Some(clip_id) {
            return PressOutcome::Select(clip_id.clone());
        }

        let mode = DragMode::from(zone);
        let reference_value = match mode {
            DragMode::TrimStart | DragMode::Move => clip.edited_start(),
            DragMode::TrimEnd => clip.edited_end(),
        };
        debug!(clip = %clip_id, ?mode, reference_value, "Drag started");

        self.session = Some(DragSession {
            mode,
            clip_id: clip_id.clone(),
            reference_value,
            reference_pointer_x: pointer_x,
            _listeners: listeners.attach(),
        });
        PressOutcome::Started(mode)
    }

    /// Apply a pointer move to the active clip. Returns whether bounds changed.
    pub fn pointer_move(
        &mut self,
        collection: &mut ClipCollection,
        geometry: &TimelineGeometry,
        pointer_x: f64,
    ) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let delta_px = pointer_x - session.reference_pointer_x;
        if delta_px == 0.0 {
            return false;
        }
        let Some(clip) = collection.get(&session.clip_id) else {
            return false;
        };
        let Some((min_bound, max_bound)) = collection.compute_bounds(&session.clip_id) else {
            return false;
        };

        let proposed = session.reference_value + geometry.px_to_seconds(delta_px);
        let (current, lo, hi) = match session.mode {
            DragMode::TrimStart => (
                clip.edited_start(),
                min_bound,
                clip.edited_end() - self.min_clip_length,
            ),
            DragMode::TrimEnd => (
                clip.edited_end(),
                clip.edited_start() + self.min_clip_length,
                max_bound,
            ),
            DragMode::Move => (clip.edited_start(), min_bound, max_bound - clip.duration()),
        };
        if lo > hi {
            return false;
        }
        let value = clamp_time(proposed, lo, hi);
        // A clamp that pushes the edge against the pointer leaves the clip alone
        if value == current || (value - current) * (proposed - current) < 0.0 {
            return false;
        }
        let (start, end) = match session.mode {
            DragMode::TrimStart => (value, clip.edited_end()),
            DragMode::TrimEnd => (clip.edited_start(), value),
            DragMode::Move => (value, value + clip.duration()),
        };

        let clip_id = session.clip_id.clone();
        collection.set_edited_bounds(&clip_id, start, end)
    }

    /// End the gesture and open the seek-suppression window.
    ///
    /// Returns the clip that was being dragged.
    pub fn release(&mut self, now: Instant) -> Option<ClipId> {
        let session = self.session.take()?;
        self.suppress_seek_until = Some(now + self.debounce);
        debug!(clip = %session.clip_id, "Drag released");
        Some(session.clip_id)
    }

    /// Abandon any gesture without a debounce window.
    pub fn cancel(&mut self) {
        self.session = None;
        self.suppress_seek_until = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// The active gesture, if any.
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Whether a timeline seek at `now` should be ignored.
    pub fn suppresses_seek(&self, now: Instant) -> bool {
        self.session.is_some() || self.suppress_seek_until.is_some_and(|until| now < until)
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(editing::SEEK_DEBOUNCE, editing::MIN_CLIP_LENGTH)
    }
}
