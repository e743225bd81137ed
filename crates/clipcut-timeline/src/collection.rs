//! The editable clip collection.
//!
//! Clips are kept sorted by edited start. Every mutation clamps against the
//! neighbouring clips, so edited intervals never overlap and never leave the
//! timeline.

use clipcut_core::{clamp_time, editing, TimeSpan};
use serde_json::Value;
use tracing::{debug, warn};

use crate::clip::{CaptionSegment, CaptionStyle, Clip, ClipId};
use crate::error::ValidationError;

// ── Upstream records ────────────────────────────────────────────

/// A clip record as delivered by the analysis pipeline, before validation.
///
/// Fields are kept in their raw JSON form; [`RawClip::validate`] is the only
/// way to turn one into a [`Clip`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawClip {
    index: usize,
    id: Option<Value>,
    start_time: Option<Value>,
    end_time: Option<Value>,
    title: Option<String>,
    text: Option<String>,
    path: Option<String>,
}

impl RawClip {
    /// Wrap the `index`-th upstream record.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, ValidationError> {
        let obj = value
            .as_object()
            .ok_or(ValidationError::NotAnObject { index })?;
        let string_field = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            index,
            id: obj.get("id").cloned(),
            start_time: obj.get("start_time").cloned(),
            end_time: obj.get("end_time").cloned(),
            title: string_field("title"),
            text: string_field("text"),
            path: string_field("path").or_else(|| string_field("url_path")),
        })
    }

    /// Validate into a well-typed clip.
    pub fn validate(self) -> Result<Clip, ValidationError> {
        let id = match &self.id {
            Some(Value::String(s)) if !s.trim().is_empty() => ClipId::new(s.trim()),
            Some(Value::Number(n)) => ClipId::new(n.to_string()),
            _ => return Err(ValidationError::MissingId { index: self.index }),
        };

        let start = time_field(&id, self.start_time.as_ref(), "start_time")?;
        let end = time_field(&id, self.end_time.as_ref(), "end_time")?;

        if start < 0.0 {
            return Err(ValidationError::NegativeStart { id, start });
        }
        if start >= end {
            return Err(ValidationError::EmptySpan { id, start, end });
        }

        let mut clip = Clip::new(id, start, end);
        clip.title = self.title;
        clip.text = self.text;
        if let Some(path) = self.path {
            clip = clip.with_media(path);
        }
        Ok(clip)
    }
}

fn time_field(
    id: &ClipId,
    value: Option<&Value>,
    field: &'static str,
) -> Result<f64, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingTime {
            id: id.clone(),
            field,
        }),
        Some(v) => v
            .as_f64()
            .filter(|t| t.is_finite())
            .ok_or_else(|| ValidationError::NonNumericTime {
                id: id.clone(),
                field,
            }),
    }
}

// ── Collection ──────────────────────────────────────────────────

/// An ordered, non-overlapping set of editable clips on one timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipCollection {
    clips: Vec<Clip>,
    timeline_duration: f64,
    min_clip_length: f64,
}

impl ClipCollection {
    /// Normalize upstream records into a collection.
    ///
    /// `timeline_duration` defaults to the latest clip end. Fails on the first
    /// invalid record, on duplicate ids, and on any overlap between clips.
    pub fn ingest(
        records: &[Value],
        timeline_duration: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let clips = records
            .iter()
            .enumerate()
            .map(|(index, value)| RawClip::from_value(index, value)?.validate())
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_clips(clips, timeline_duration)
    }

    /// Build a collection from already-typed clips, applying the same checks
    /// as [`ClipCollection::ingest`].
    pub fn from_clips(
        mut clips: Vec<Clip>,
        timeline_duration: Option<f64>,
    ) -> Result<Self, ValidationError> {
        for clip in &clips {
            if !clip.edited_span().is_valid() {
                return Err(ValidationError::EmptySpan {
                    id: clip.id().clone(),
                    start: clip.edited_start(),
                    end: clip.edited_end(),
                });
            }
        }

        let latest_end = clips.iter().map(Clip::edited_end).fold(0.0, f64::max);
        let duration = match timeline_duration {
            Some(d) if d.is_finite() && d > 0.0 => d,
            Some(d) => return Err(ValidationError::InvalidTimeline { duration: d }),
            None => latest_end,
        };

        clips.sort_by(|a, b| a.edited_start().total_cmp(&b.edited_start()));

        for (i, clip) in clips.iter().enumerate() {
            if clip.edited_end() > duration {
                return Err(ValidationError::BeyondTimeline {
                    id: clip.id().clone(),
                    end: clip.edited_end(),
                    duration,
                });
            }
            if clips[..i].iter().any(|other| other.id() == clip.id()) {
                return Err(ValidationError::DuplicateId {
                    id: clip.id().clone(),
                });
            }
        }

        for pair in clips.windows(2) {
            if pair[0].edited_span().overlaps(pair[1].edited_span()) {
                return Err(ValidationError::Overlap {
                    first: pair[0].id().clone(),
                    second: pair[1].id().clone(),
                });
            }
        }

        debug!(clips = clips.len(), duration, "Ingested clip collection");
        Ok(Self {
            clips,
            timeline_duration: duration,
            min_clip_length: editing::MIN_CLIP_LENGTH,
        })
    }

    /// Override the minimum clip length used when clamping edits.
    pub fn with_min_clip_length(mut self, seconds: f64) -> Self {
        self.min_clip_length = seconds;
        self
    }

    pub fn timeline_duration(&self) -> f64 {
        self.timeline_duration
    }

    pub fn min_clip_length(&self) -> f64 {
        self.min_clip_length
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clips in timeline order.
    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    /// Get a clip by id.
    pub fn get(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id() == id)
    }

    /// Get the clip at a timeline-order index.
    pub fn get_index(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    /// Timeline-order index of a clip.
    pub fn position_of(&self, id: &ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id() == id)
    }

    /// Find the clip whose edited span contains `time`.
    pub fn clip_at_time(&self, time: f64) -> Option<(usize, &Clip)> {
        self.clips
            .iter()
            .enumerate()
            .find(|(_, c)| c.edited_span().contains(time))
    }

    /// Legal edit range for a clip's endpoints.
    ///
    /// The lower bound is the edited end of the nearest clip starting before
    /// this one (or 0), the upper bound the edited start of the nearest clip
    /// starting after it (or the timeline duration). The clip itself never
    /// participates.
    pub fn compute_bounds(&self, id: &ClipId) -> Option<(f64, f64)> {
        let target = self.get(id)?;
        let start = target.edited_start();

        let mut min_bound = 0.0_f64;
        let mut max_bound = self.timeline_duration;
        for other in self.clips.iter().filter(|c| c.id() != id) {
            if other.edited_start() < start {
                min_bound = min_bound.max(other.edited_end());
            } else {
                max_bound = max_bound.min(other.edited_start());
            }
        }
        Some((min_bound, max_bound))
    }

    /// Write new edited bounds after clamping them into the legal range.
    ///
    /// Returns `false` (and leaves the clip untouched) when the clip is
    /// unknown, the input is not finite, or the clamped span would be shorter
    /// than the minimum clip length.
    pub fn set_edited_bounds(&mut self, id: &ClipId, start: f64, end: f64) -> bool {
        if !start.is_finite() || !end.is_finite() {
            return false;
        }
        let Some((min_bound, max_bound)) = self.compute_bounds(id) else {
            warn!(clip = %id, "Bounds update for unknown clip");
            return false;
        };

        let start = clamp_time(start, min_bound, max_bound);
        let end = clamp_time(end, min_bound, max_bound);
        if end - start < self.min_clip_length {
            return false;
        }

        let Some(clip) = self.clips.iter_mut().find(|c| c.id() == id) else {
            return false;
        };
        clip.set_edited(TimeSpan::new(start, end));
        debug_assert!(self.check_invariants().is_ok());
        true
    }

    /// Replace a clip's caption segments.
    pub fn set_captions(&mut self, id: &ClipId, captions: Vec<CaptionSegment>) -> bool {
        match self.clip_mut(id) {
            Some(clip) => {
                clip.set_captions(captions);
                true
            }
            None => false,
        }
    }

    /// Replace a clip's caption style.
    pub fn set_caption_style(&mut self, id: &ClipId, style: CaptionStyle) -> bool {
        match self.clip_mut(id) {
            Some(clip) => {
                clip.set_caption_style(style);
                true
            }
            None => false,
        }
    }

    /// Swap a clip's preview asset, keeping the pre-caption asset as fallback.
    ///
    /// Returns `false` when the clip has no media to swap.
    pub fn swap_media(&mut self, id: &ClipId, new_current: impl Into<String>) -> bool {
        match self.clip_mut(id).and_then(Clip::media_mut) {
            Some(media) => {
                media.swap(new_current);
                true
            }
            None => false,
        }
    }

    /// Verify ordering, bounds containment and the no-overlap invariant.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        for clip in &self.clips {
            let span = clip.edited_span();
            if span.start < 0.0 {
                return Err(ValidationError::NegativeStart {
                    id: clip.id().clone(),
                    start: span.start,
                });
            }
            if !span.is_valid() {
                return Err(ValidationError::EmptySpan {
                    id: clip.id().clone(),
                    start: span.start,
                    end: span.end,
                });
            }
            if span.end > self.timeline_duration {
                return Err(ValidationError::BeyondTimeline {
                    id: clip.id().clone(),
                    end: span.end,
                    duration: self.timeline_duration,
                });
            }
            let duration = clip.duration();
            if let Some(index) = clip.captions().iter().position(|s| !s.fits_within(duration)) {
                return Err(ValidationError::CaptionOutOfRange {
                    id: clip.id().clone(),
                    index,
                });
            }
        }
        for pair in self.clips.windows(2) {
            if pair[0].edited_end() > pair[1].edited_start() {
                return Err(ValidationError::Overlap {
                    first: pair[0].id().clone(),
                    second: pair[1].id().clone(),
                });
            }
        }
        Ok(())
    }

    fn clip_mut(&mut self, id: &ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id() == id)
    }
}
