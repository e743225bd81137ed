//! Per-clip caption workflow.
//!
//! Caption data lives on the clip inside the [`ClipCollection`]; the workflow
//! tracks the stage and the single in-flight external call. Each external
//! operation is split into `begin_*` (build the request, claim the in-flight
//! slot) and `complete_*` (apply the result), so an event loop can run the
//! call elsewhere and feed the result back. [`CaptionWorkflow::generate`] and
//! [`CaptionWorkflow::apply`] do both halves in one call.

use clipcut_service::{
    ApplyCaptionsRequest, ApplyCaptionsResponse, ClipService, GenerateCaptionsRequest,
    GenerateCaptionsResponse, ServiceResult,
};
use clipcut_timeline::{
    fit_captions, CaptionSegment, CaptionStyle, Clip, ClipCollection, ClipId,
};
use tracing::{debug, info, warn};

use crate::error::{CaptionError, CaptionResult};
use crate::fallback::demo_captions;
use crate::style::validate_style;

/// Progress of a clip through the caption workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptionStage {
    #[default]
    None,
    Generated,
    Styled,
    Edited,
    Applied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Generate,
    Apply,
}

/// Result of a generate call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// The service produced this many segments.
    Generated(usize),
    /// The service failed; demonstration captions were used instead.
    Fallback { reason: String },
}

/// Result of an apply call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The preview now shows the captioned asset.
    Swapped { asset: String },
    /// Burn-in succeeded but no preview asset came back.
    NoPreview,
    /// Burn-in failed; captions stay local and the preview is unchanged.
    Failed { reason: String },
}

/// Caption workflow state for one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionWorkflow {
    clip_id: ClipId,
    stage: CaptionStage,
    in_flight: Option<InFlight>,
    last_error: Option<String>,
}

impl CaptionWorkflow {
    pub fn new(clip_id: ClipId) -> Self {
        Self {
            clip_id,
            stage: CaptionStage::None,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn clip_id(&self) -> &ClipId {
        &self.clip_id
    }

    pub fn stage(&self) -> CaptionStage {
        self.stage
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Message from the last degraded generate or apply.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Generate ──────────────────────────────────────────────

    /// Claim the in-flight slot and build a generate request.
    ///
    /// Returns `Ok(None)` when a call for this clip is already running.
    pub fn begin_generate(
        &mut self,
        collection: &ClipCollection,
        job_id: &str,
    ) -> CaptionResult<Option<GenerateCaptionsRequest>> {
        let clip = self.clip(collection)?;
        if self.in_flight.is_some() {
            debug!(clip = %self.clip_id, "Caption call already in flight");
            return Ok(None);
        }
        self.in_flight = Some(InFlight::Generate);
        Ok(Some(GenerateCaptionsRequest {
            job_id: job_id.to_string(),
            clip_id: self.clip_id.clone(),
            style: clip.caption_style().cloned(),
        }))
    }

    /// Store generated captions, or demonstration captions when the call failed.
    pub fn complete_generate(
        &mut self,
        collection: &mut ClipCollection,
        result: ServiceResult<GenerateCaptionsResponse>,
    ) -> CaptionResult<GenerateOutcome> {
        if self.in_flight != Some(InFlight::Generate) {
            return Err(CaptionError::Validation(
                "no caption generation in flight".into(),
            ));
        }
        self.in_flight = None;
        let clip = self.clip(collection)?;

        let generated = match result {
            Ok(response) => {
                let segments = normalize_segments(response.captions, clip);
                if segments.is_empty() {
                    Err("service returned no usable captions".to_string())
                } else {
                    Ok(segments)
                }
            }
            Err(err) => Err(err.user_message()),
        };

        let (segments, outcome) = match generated {
            Ok(segments) => {
                let count = segments.len();
                info!(clip = %self.clip_id, segments = count, "Captions generated");
                self.last_error = None;
                (segments, GenerateOutcome::Generated(count))
            }
            Err(reason) => {
                warn!(clip = %self.clip_id, %reason, "Caption generation failed, using demo captions");
                self.last_error = Some(reason.clone());
                (demo_captions(clip.duration()), GenerateOutcome::Fallback { reason })
            }
        };

        if clip.caption_style().is_none() {
            collection.set_caption_style(&self.clip_id, CaptionStyle::default());
        }
        collection.set_captions(&self.clip_id, segments);
        self.stage = CaptionStage::Generated;
        Ok(outcome)
    }

    /// Generate captions through `service`, falling back to demonstration
    /// captions on failure. A no-op returning `None` while a call is running.
    pub async fn generate(
        &mut self,
        service: &dyn ClipService,
        collection: &mut ClipCollection,
        job_id: &str,
    ) -> CaptionResult<Option<GenerateOutcome>> {
        let Some(request) = self.begin_generate(collection, job_id)? else {
            return Ok(None);
        };
        let result = service.generate_captions(&request).await;
        self.complete_generate(collection, result).map(Some)
    }

    // ── Local edits ───────────────────────────────────────────

    /// Validate and store a new caption style.
    pub fn restyle(
        &mut self,
        collection: &mut ClipCollection,
        style: CaptionStyle,
    ) -> CaptionResult<()> {
        self.clip(collection)?;
        let style = validate_style(style)?;
        collection.set_caption_style(&self.clip_id, style);
        self.stage = match self.stage {
            CaptionStage::None => CaptionStage::None,
            CaptionStage::Edited => CaptionStage::Edited,
            CaptionStage::Generated | CaptionStage::Styled | CaptionStage::Applied => {
                CaptionStage::Styled
            }
        };
        Ok(())
    }

    /// Replace the text of one segment, leaving its timing untouched.
    pub fn edit_segment_text(
        &mut self,
        collection: &mut ClipCollection,
        index: usize,
        text: impl Into<String>,
    ) -> CaptionResult<()> {
        let clip = self.clip(collection)?;
        let mut segments = clip.captions().to_vec();
        let len = segments.len();
        let segment = segments
            .get_mut(index)
            .ok_or(CaptionError::SegmentOutOfRange { index, len })?;
        segment.text = text.into();
        collection.set_captions(&self.clip_id, segments);
        self.stage = CaptionStage::Edited;
        Ok(())
    }

    // ── Apply ─────────────────────────────────────────────────

    /// Store `segments` and `style` locally, claim the in-flight slot and
    /// build a burn-in request.
    ///
    /// The captions are kept on the clip whatever the call's result.
    /// Returns `Ok(None)` when a call for this clip is already running.
    pub fn begin_apply(
        &mut self,
        collection: &mut ClipCollection,
        job_id: &str,
        segments: Vec<CaptionSegment>,
        style: CaptionStyle,
    ) -> CaptionResult<Option<ApplyCaptionsRequest>> {
        let clip = self.clip(collection)?;
        if self.in_flight.is_some() {
            debug!(clip = %self.clip_id, "Caption call already in flight");
            return Ok(None);
        }
        // Local captions are already clip-relative
        let segments = fit_captions(segments, clip.duration());
        if segments.is_empty() {
            return Err(CaptionError::Validation("no captions to apply".into()));
        }
        let style = validate_style(style)?;

        collection.set_captions(&self.clip_id, segments.clone());
        collection.set_caption_style(&self.clip_id, style.clone());
        self.in_flight = Some(InFlight::Apply);
        Ok(Some(ApplyCaptionsRequest {
            job_id: job_id.to_string(),
            clip_id: self.clip_id.clone(),
            captions: segments,
            style,
        }))
    }

    /// Swap in the captioned asset on success; on failure keep everything as is.
    pub fn complete_apply(
        &mut self,
        collection: &mut ClipCollection,
        result: ServiceResult<ApplyCaptionsResponse>,
    ) -> CaptionResult<ApplyOutcome> {
        if self.in_flight != Some(InFlight::Apply) {
            return Err(CaptionError::Validation("no caption apply in flight".into()));
        }
        self.in_flight = None;
        self.clip(collection)?;

        match result {
            Ok(ApplyCaptionsResponse {
                preview_url: Some(asset),
            }) => {
                if !collection.swap_media(&self.clip_id, asset.clone()) {
                    warn!(clip = %self.clip_id, "Captioned asset returned for clip without media");
                }
                info!(clip = %self.clip_id, %asset, "Captions applied");
                self.stage = CaptionStage::Applied;
                self.last_error = None;
                Ok(ApplyOutcome::Swapped { asset })
            }
            Ok(ApplyCaptionsResponse { preview_url: None }) => {
                info!(clip = %self.clip_id, "Captions applied without preview");
                self.stage = CaptionStage::Applied;
                self.last_error = None;
                Ok(ApplyOutcome::NoPreview)
            }
            Err(err) => {
                let reason = err.user_message();
                warn!(clip = %self.clip_id, %reason, "Caption apply failed, keeping captions locally");
                self.last_error = Some(reason.clone());
                Ok(ApplyOutcome::Failed { reason })
            }
        }
    }

    /// Apply the clip's current captions and style through `service`.
    pub async fn apply(
        &mut self,
        service: &dyn ClipService,
        collection: &mut ClipCollection,
        job_id: &str,
    ) -> CaptionResult<Option<ApplyOutcome>> {
        let clip = self.clip(collection)?;
        let segments = clip.captions().to_vec();
        let style = clip.caption_style().cloned().unwrap_or_default();
        let Some(request) = self.begin_apply(collection, job_id, segments, style)? else {
            return Ok(None);
        };
        let result = service.apply_captions(&request).await;
        self.complete_apply(collection, result).map(Some)
    }

    fn clip<'a>(&self, collection: &'a ClipCollection) -> CaptionResult<&'a Clip> {
        collection
            .get(&self.clip_id)
            .ok_or_else(|| CaptionError::UnknownClip(self.clip_id.clone()))
    }
}

/// Bring freshly generated segments onto the clip's own zero.
///
/// The transcription service may answer in timeline time. Segments that all
/// sit inside the clip's edited span, with some past its duration, are
/// shifted by the edited start before being fitted to the clip.
pub fn normalize_segments(segments: Vec<CaptionSegment>, clip: &Clip) -> Vec<CaptionSegment> {
    let offset = clip.edited_start();
    let timeline_relative = offset > 0.0
        && segments.iter().any(|s| s.end > clip.duration())
        && segments
            .iter()
            .all(|s| s.start >= offset && s.end <= clip.edited_end());
    if !timeline_relative {
        return fit_captions(segments, clip.duration());
    }
    let shifted = segments
        .into_iter()
        .map(|mut s| {
            s.start -= offset;
            s.end -= offset;
            s
        })
        .collect();
    fit_captions(shifted, clip.duration())
}
