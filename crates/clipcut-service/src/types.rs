//! Wire types for the processing, finalize and caption endpoints.

use clipcut_core::format_timestamp;
use clipcut_timeline::{CaptionSegment, CaptionStyle, ClipId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Job submission and status ───────────────────────────────────

/// Request to turn a long video into clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Source video URL
    pub url: String,
    /// What the clips should be about
    pub prompt: String,
}

/// Lifecycle status reported by the processing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Complete,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether the job is still running upstream.
    pub fn is_running(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Processing)
    }
}

/// Response to a job submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub message: String,
}

/// Response to a status poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub message: String,
    /// Raw clip records; present only once the job is complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
}

// ── Finalize ────────────────────────────────────────────────────

/// One clip's edited state in a finalize batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeClip {
    pub id: ClipId,
    pub edited_start: f64,
    pub edited_end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<Vec<CaptionSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_style: Option<CaptionStyle>,
    pub has_captioned_version: bool,
}

/// Batched finalize request for every clip of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub job_id: String,
    pub clips: Vec<FinalizeClip>,
}

/// Response to a finalize request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub finalized_clips: Vec<FinalizedClip>,
}

impl FinalizeResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// An output clip produced by the finalize service. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedClip {
    id: ClipId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    start_time: f64,
    end_time: f64,
    #[serde(default, alias = "finalized_path", alias = "url_path")]
    path: Option<String>,
    #[serde(default)]
    captions: Vec<CaptionSegment>,
    #[serde(default, alias = "hasCaptions")]
    has_captions: bool,
}

impl FinalizedClip {
    pub fn new(id: impl Into<ClipId>, start_time: f64, end_time: f64) -> Self {
        Self {
            id: id.into(),
            title: None,
            text: None,
            start_time,
            end_time,
            path: None,
            captions: Vec::new(),
            has_captions: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &ClipId {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn formatted_start(&self) -> String {
        format_timestamp(self.start_time)
    }

    pub fn formatted_end(&self) -> String {
        format_timestamp(self.end_time)
    }

    /// Path of the re-encoded asset.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn captions(&self) -> &[CaptionSegment] {
        &self.captions
    }

    /// Whether captions were burned into the finalized asset.
    pub fn has_captions(&self) -> bool {
        self.has_captions
    }
}

// ── Captions ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCaptionsRequest {
    pub job_id: String,
    pub clip_id: ClipId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CaptionStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateCaptionsResponse {
    pub captions: Vec<CaptionSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCaptionsRequest {
    pub job_id: String,
    pub clip_id: ClipId,
    pub captions: Vec<CaptionSegment>,
    pub style: CaptionStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCaptionsResponse {
    /// Captioned preview asset, when the service produced one
    #[serde(default)]
    pub preview_url: Option<String>,
}
