//! Clip types for the editing timeline.

use clipcut_core::{format_timestamp, TimeSpan};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stable clip identifier assigned by the producing pipeline.
///
/// Upstream sends either numbers or strings; both normalize to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClipId(String);

impl ClipId {
    /// Create a clip id from any textual form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ClipId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

impl From<&str> for ClipId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for ClipId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// One caption line, timed relative to the clip's own zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    /// Start offset within the clip (seconds)
    pub start: f64,
    /// End offset within the clip (seconds)
    pub end: f64,
    /// Caption text
    pub text: String,
}

impl CaptionSegment {
    /// Create a new caption segment.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// True when `0 <= start < end <= clip_duration`.
    pub fn fits_within(&self, clip_duration: f64) -> bool {
        self.start >= 0.0 && self.start < self.end && self.end <= clip_duration
    }
}

/// Clip every segment to `[0, clip_duration]` and drop the ones left empty.
///
/// Non-finite segments are dropped too. The result is ordered by start.
pub fn fit_captions(segments: Vec<CaptionSegment>, clip_duration: f64) -> Vec<CaptionSegment> {
    let mut fitted: Vec<CaptionSegment> = segments
        .into_iter()
        .filter(|s| s.start.is_finite() && s.end.is_finite())
        .map(|mut s| {
            s.start = s.start.clamp(0.0, clip_duration);
            s.end = s.end.clamp(0.0, clip_duration);
            s
        })
        .filter(|s| s.start < s.end)
        .collect();
    fitted.sort_by(|a, b| a.start.total_cmp(&b.start));
    fitted
}

/// Vertical placement of burned-in captions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Caption entry animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionAnimation {
    #[default]
    None,
    Pop,
    Slide,
    Typewriter,
}

/// Visual style applied when captions are burned into a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    pub font_size: u32,
    /// `#RRGGBB`
    pub font_color: String,
    /// `#RRGGBB` or `transparent`
    pub background_color: String,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub background_opacity: f32,
    /// `#RRGGBB`
    pub outline_color: String,
    pub outline_width: u32,
    pub position: CaptionPosition,
    pub animation: CaptionAnimation,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 48,
            font_color: "#FFFFFF".to_string(),
            background_color: "transparent".to_string(),
            background_opacity: 0.0,
            outline_color: "#000000".to_string(),
            outline_width: 3,
            position: CaptionPosition::Bottom,
            animation: CaptionAnimation::None,
        }
    }
}

/// Previewable media for a clip.
///
/// `fallback` holds the pre-caption asset once a captioned version has been
/// swapped in; it is never overwritten by later swaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    current: String,
    fallback: Option<String>,
}

impl MediaRef {
    /// Create a reference to an uncaptioned asset.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            current: path.into(),
            fallback: None,
        }
    }

    /// The asset the preview should show.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// The pre-caption asset, if a captioned version replaced it.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Whether a captioned version has been swapped in.
    pub fn has_captioned_version(&self) -> bool {
        self.fallback.is_some()
    }

    /// Swap in a new current asset, keeping the original as fallback.
    pub fn swap(&mut self, new_current: impl Into<String>) {
        let previous = std::mem::replace(&mut self.current, new_current.into());
        if self.fallback.is_none() {
            self.fallback = Some(previous);
        }
    }
}

/// A clip on the editing timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    id: ClipId,
    original: TimeSpan,
    edited: TimeSpan,
    /// Title from the analysis pipeline
    pub title: Option<String>,
    /// Transcript excerpt from the analysis pipeline
    pub text: Option<String>,
    captions: Vec<CaptionSegment>,
    caption_style: Option<CaptionStyle>,
    media: Option<MediaRef>,
}

impl Clip {
    /// Create a clip whose edited bounds start equal to its original bounds.
    pub fn new(id: impl Into<ClipId>, start: f64, end: f64) -> Self {
        let span = TimeSpan::new(start, end);
        Self {
            id: id.into(),
            original: span,
            edited: span,
            title: None,
            text: None,
            captions: Vec::new(),
            caption_style: None,
            media: None,
        }
    }

    /// Attach a media reference.
    pub fn with_media(mut self, path: impl Into<String>) -> Self {
        self.media = Some(MediaRef::new(path));
        self
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &ClipId {
        &self.id
    }

    pub fn original_start(&self) -> f64 {
        self.original.start
    }

    pub fn original_end(&self) -> f64 {
        self.original.end
    }

    pub fn edited_start(&self) -> f64 {
        self.edited.start
    }

    pub fn edited_end(&self) -> f64 {
        self.edited.end
    }

    /// Edited bounds as a span.
    pub fn edited_span(&self) -> TimeSpan {
        self.edited
    }

    /// Edited length in seconds.
    pub fn duration(&self) -> f64 {
        self.edited.duration()
    }

    /// Edited start as `MM:SS`.
    pub fn formatted_start(&self) -> String {
        format_timestamp(self.edited.start)
    }

    /// Edited end as `MM:SS`.
    pub fn formatted_end(&self) -> String {
        format_timestamp(self.edited.end)
    }

    /// Whether the edited bounds differ from what the pipeline produced.
    pub fn is_modified(&self) -> bool {
        self.edited != self.original
    }

    pub fn captions(&self) -> &[CaptionSegment] {
        &self.captions
    }

    pub fn caption_style(&self) -> Option<&CaptionStyle> {
        self.caption_style.as_ref()
    }

    pub fn media(&self) -> Option<&MediaRef> {
        self.media.as_ref()
    }

    /// The asset path the preview should load for this clip.
    pub fn preview_asset(&self) -> Option<&str> {
        self.media.as_ref().map(MediaRef::current)
    }

    /// Change the edited bounds, keeping captions inside the new duration.
    ///
    /// When only the start moves, captions follow the source content they
    /// were timed against, so they shift by the trimmed amount.
    pub(crate) fn set_edited(&mut self, span: TimeSpan) {
        let shift = if span.end == self.edited.end {
            self.edited.start - span.start
        } else {
            0.0
        };
        if !self.captions.is_empty() {
            let shifted = std::mem::take(&mut self.captions)
                .into_iter()
                .map(|mut s| {
                    s.start += shift;
                    s.end += shift;
                    s
                })
                .collect();
            self.captions = fit_captions(shifted, span.duration());
        }
        self.edited = span;
    }

    pub(crate) fn set_captions(&mut self, captions: Vec<CaptionSegment>) {
        self.captions = fit_captions(captions, self.duration());
    }

    pub(crate) fn set_caption_style(&mut self, style: CaptionStyle) {
        self.caption_style = Some(style);
    }

    pub(crate) fn media_mut(&mut self) -> Option<&mut MediaRef> {
        self.media.as_mut()
    }
}
