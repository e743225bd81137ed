//! Event-driven editor session.
//!
//! The session owns all editor state. User actions are synchronous methods;
//! external calls run as spawned tasks that only perform I/O and report back
//! through an unbounded channel. Results are applied on the session's own
//! task via [`EditorSession::handle_event`], so no two handlers ever mutate
//! state concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use clipcut_captions::{ApplyOutcome, CaptionStage, CaptionWorkflow, GenerateOutcome};
use clipcut_core::EditorConfig;
use clipcut_service::{
    ApplyCaptionsResponse, ClipService, FinalizeResponse, FinalizedClip, GenerateCaptionsResponse,
    JobStatus, JobStatusResponse, ProcessRequest, ProcessResponse, ServiceResult,
};
use clipcut_timeline::{
    hit_test, CaptionStyle, ClipCollection, ClipId, DragController, DragZone, PlaybackSynchronizer,
    PointerListeners, PressOutcome, PreviewSwap, SeekOutcome, TimelineGeometry,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SessionError, SessionResult, TransitionError};
use crate::event::SessionEvent;
use crate::finalize::FinalizationCoordinator;
use crate::job::{JobPhase, JobStateMachine, PollDisposition};
use crate::poller::PollTask;

/// One user's editing session against the processing service.
pub struct EditorSession {
    id: Uuid,
    config: EditorConfig,
    service: Arc<dyn ClipService>,
    machine: JobStateMachine,
    drag: DragController,
    playback: PlaybackSynchronizer,
    captions: HashMap<ClipId, CaptionWorkflow>,
    poller: Option<PollTask>,
    submit_in_flight: bool,
    finalize_in_flight: bool,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, service: Arc<dyn ClipService>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        info!(session = %id, service = %config.service_url, "Editor session created");
        Self {
            id,
            machine: Self::machine_for(&config),
            drag: DragController::new(config.seek_debounce, config.min_clip_length),
            playback: PlaybackSynchronizer::new(),
            captions: HashMap::new(),
            poller: None,
            submit_in_flight: false,
            finalize_in_flight: false,
            config,
            service,
            events_tx,
            events_rx,
        }
    }

    fn machine_for(config: &EditorConfig) -> JobStateMachine {
        JobStateMachine::new()
            .with_timeline_duration(config.timeline_duration)
            .with_min_clip_length(config.min_clip_length)
    }

    // ── Job lifecycle ─────────────────────────────────────────

    /// Submit a new job. A second submit while one is outstanding is a no-op
    /// returning `false`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, url: impl Into<String>, prompt: impl Into<String>) -> SessionResult<bool> {
        if self.machine.phase() != JobPhase::Input {
            return Err(TransitionError::new(self.machine.phase(), "submit").into());
        }
        if self.submit_in_flight {
            debug!(session = %self.id, "Submit already in flight");
            return Ok(false);
        }
        let request = ProcessRequest {
            url: url.into(),
            prompt: prompt.into(),
        };
        info!(session = %self.id, url = %request.url, "Submitting job");
        self.submit_in_flight = true;
        let generation = self.machine.generation();
        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.submit_job(&request).await;
            let _ = events.send(SessionEvent::Submitted { generation, result });
        });
        Ok(true)
    }

    /// Send the edited collection for re-encoding. A second finalize while
    /// one is outstanding is a no-op returning `false`.
    pub fn finalize(&mut self) -> SessionResult<bool> {
        if self.finalize_in_flight {
            debug!(session = %self.id, "Finalize already in flight");
            return Ok(false);
        }
        let (job_id, clips) = match (self.machine.job_id(), self.machine.clips()) {
            (Some(job_id), Some(clips)) if self.machine.phase() == JobPhase::Editing => {
                (job_id.to_string(), clips)
            }
            _ => return Err(TransitionError::new(self.machine.phase(), "finalize").into()),
        };
        let request = FinalizationCoordinator::build_request(&job_id, clips);

        self.drag.cancel();
        self.poller = None;
        let generation = self.machine.begin_finalize()?;
        self.finalize_in_flight = true;
        info!(session = %self.id, %job_id, clips = request.clips.len(), "Finalizing");

        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.finalize(&request).await;
            let _ = events.send(SessionEvent::Finalized { generation, result });
        });
        Ok(true)
    }

    /// Discard the job, its clips and all caption state.
    pub fn reset(&mut self) {
        info!(session = %self.id, from = %self.machine.phase(), "Resetting session");
        self.poller = None;
        self.drag.cancel();
        self.playback.clear();
        self.captions.clear();
        self.submit_in_flight = false;
        self.finalize_in_flight = false;
        self.machine.reset();
    }

    // ── Events ────────────────────────────────────────────────

    /// Wait for the next completed external call.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Apply every already-completed call without waiting. Returns how many
    /// events were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Handle events until the job is no longer waiting on the service.
    pub async fn run_until_settled(&mut self) -> JobPhase {
        while self.submit_in_flight || self.machine.phase().is_busy() {
            match self.next_event().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
        self.machine.phase()
    }

    /// Handle events until no external call is outstanding, caption calls
    /// included.
    pub async fn run_until_idle(&mut self) -> JobPhase {
        while self.has_pending_calls() {
            match self.next_event().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
        self.machine.phase()
    }

    /// Whether any external call is still outstanding.
    pub fn has_pending_calls(&self) -> bool {
        self.submit_in_flight
            || self.machine.phase().is_busy()
            || (self.machine.phase() == JobPhase::Editing
                && self.captions.values().any(CaptionWorkflow::is_busy))
    }

    /// Apply one completed external call.
    pub fn handle_event(&mut self, event: SessionEvent) {
        if !self.machine.is_current(event.generation()) {
            debug!(
                kind = event.kind(),
                generation = event.generation(),
                current = self.machine.generation(),
                "Dropping stale event"
            );
            return;
        }
        match event {
            SessionEvent::Submitted { result, .. } => self.on_submitted(result),
            SessionEvent::Polled { generation, result } => self.on_polled(generation, result),
            SessionEvent::Finalized { generation, result } => self.on_finalized(generation, result),
            SessionEvent::CaptionsGenerated {
                clip_id, result, ..
            } => self.on_captions_generated(&clip_id, result),
            SessionEvent::CaptionsApplied {
                clip_id, result, ..
            } => self.on_captions_applied(&clip_id, result),
        }
    }

    fn on_submitted(&mut self, result: ServiceResult<ProcessResponse>) {
        self.submit_in_flight = false;
        let outcome = match result {
            Ok(response) if response.status == JobStatus::Failed => {
                self.machine.submit_rejected(response.message).map(|_| ())
            }
            Ok(response) => self.machine.submit_accepted(&response.job_id).map(|generation| {
                info!(session = %self.id, job_id = %response.job_id, "Job accepted");
                self.poller = Some(PollTask::spawn(
                    Arc::clone(&self.service),
                    response.job_id,
                    generation,
                    self.config.poll_interval,
                    self.events_tx.clone(),
                ));
            }),
            Err(err) => self.machine.submit_rejected(err.user_message()).map(|_| ()),
        };
        if let Err(err) = outcome {
            warn!(error = %err, "Ignoring submit result");
        }
    }

    fn on_polled(
        &mut self,
        generation: u64,
        result: ServiceResult<JobStatusResponse>,
    ) {
        let disposition = match result {
            Ok(response) => self.machine.apply_poll(generation, response),
            Err(err) => self
                .machine
                .fail_at(generation, err.user_message())
                .map(|_| PollDisposition::Failed),
        };
        match disposition {
            Ok(PollDisposition::Running) | Ok(PollDisposition::Stale) => {}
            Ok(PollDisposition::Ready) => {
                self.poller = None;
                if let Some(clips) = self.machine.clips() {
                    self.playback.select_clip(clips, 0);
                }
            }
            Ok(PollDisposition::Failed) => self.poller = None,
            Err(err) => warn!(error = %err, "Ignoring poll result"),
        }
    }

    fn on_finalized(
        &mut self,
        generation: u64,
        result: ServiceResult<FinalizeResponse>,
    ) {
        self.finalize_in_flight = false;
        let outcome = match FinalizationCoordinator::reconcile_result(result) {
            Ok(clips) => self.machine.finalize_succeeded(generation, clips),
            Err(err) => self.machine.finalize_failed(generation, err.to_string()),
        };
        match outcome {
            Ok(_) => {
                self.playback.clear();
                self.captions.clear();
            }
            Err(err) => warn!(error = %err, "Ignoring finalize result"),
        }
    }

    fn on_captions_generated(
        &mut self,
        clip_id: &ClipId,
        result: ServiceResult<GenerateCaptionsResponse>,
    ) {
        let (Some(workflow), Some(clips)) =
            (self.captions.get_mut(clip_id), self.machine.clips_mut())
        else {
            return;
        };
        match workflow.complete_generate(clips, result) {
            Ok(GenerateOutcome::Generated(count)) => debug!(clip = %clip_id, count, "Captions ready"),
            Ok(GenerateOutcome::Fallback { .. }) => {}
            Err(err) => warn!(clip = %clip_id, error = %err, "Ignoring caption result"),
        }
    }

    fn on_captions_applied(
        &mut self,
        clip_id: &ClipId,
        result: ServiceResult<ApplyCaptionsResponse>,
    ) {
        let (Some(workflow), Some(clips)) =
            (self.captions.get_mut(clip_id), self.machine.clips_mut())
        else {
            return;
        };
        match workflow.complete_apply(clips, result) {
            Ok(ApplyOutcome::Swapped { .. }) => {
                if let Some(asset) = self.playback.refresh_preview(clips) {
                    debug!(clip = %clip_id, %asset, "Preview swapped to captioned asset");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(clip = %clip_id, error = %err, "Ignoring caption result"),
        }
    }

    // ── Timeline interaction ──────────────────────────────────

    fn editing_clips(machine: &JobStateMachine) -> SessionResult<&ClipCollection> {
        match (machine.phase(), machine.clips()) {
            (JobPhase::Editing, Some(clips)) => Ok(clips),
            (phase, _) => Err(TransitionError::new(phase, "edit").into()),
        }
    }

    /// Geometry of a timeline strip `width_px` wide.
    pub fn geometry(&self, width_px: f64) -> Option<TimelineGeometry> {
        self.machine
            .clips()
            .map(|clips| TimelineGeometry::new(width_px, clips.timeline_duration()))
    }

    /// Select the clip at `index` for preview.
    pub fn select_clip(&mut self, index: usize) -> SessionResult<Option<PreviewSwap>> {
        let clips = Self::editing_clips(&self.machine)?;
        Ok(self.playback.select_clip(clips, index))
    }

    /// Pointer pressed at `x` on the timeline strip.
    ///
    /// A press on a non-selected clip selects it; on the selected clip it
    /// starts a drag.
    pub fn pointer_down(
        &mut self,
        geometry: &TimelineGeometry,
        x: f64,
        listeners: &dyn PointerListeners,
    ) -> SessionResult<PressOutcome> {
        let clips = Self::editing_clips(&self.machine)?;
        let Some((clip_id, zone)) = hit_test(clips, geometry, x, self.config.edge_handle_px) else {
            return Ok(PressOutcome::Ignored);
        };
        self.press(&clip_id, zone, x, listeners)
    }

    /// Pointer pressed on a known clip and zone.
    pub fn press(
        &mut self,
        clip_id: &ClipId,
        zone: DragZone,
        x: f64,
        listeners: &dyn PointerListeners,
    ) -> SessionResult<PressOutcome> {
        let clips = Self::editing_clips(&self.machine)?;
        let selected = self.playback.selected_clip(clips).map(|c| c.id().clone());
        let outcome = self
            .drag
            .press(clips, clip_id, zone, x, selected.as_ref(), listeners);
        if let PressOutcome::Select(id) = &outcome {
            self.playback.select_clip_by_id(clips, id);
        }
        Ok(outcome)
    }

    /// Pointer moved during a drag. Returns whether a clip changed.
    pub fn pointer_move(&mut self, geometry: &TimelineGeometry, x: f64) -> bool {
        match self.machine.clips_mut() {
            Some(clips) => self.drag.pointer_move(clips, geometry, x),
            None => false,
        }
    }

    /// Pointer released, wherever it is.
    pub fn pointer_up(&mut self, now: Instant) -> Option<ClipId> {
        self.drag.release(now)
    }

    /// Preview player reached `local_time` within the selected clip.
    pub fn preview_time(&mut self, local_time: f64) -> f64 {
        match self.machine.clips() {
            Some(clips) => self.playback.on_preview_time_advance(clips, local_time),
            None => self.playback.current_time(),
        }
    }

    /// Click on the timeline strip at `position` (fraction of its width).
    pub fn timeline_seek(&mut self, position: f64, now: Instant) -> SeekOutcome {
        match self.machine.clips() {
            Some(clips) => self.playback.on_timeline_seek(clips, &self.drag, position, now),
            None => SeekOutcome::Ignored,
        }
    }

    // ── Captions ──────────────────────────────────────────────

    fn caption_context(&mut self, clip_id: &ClipId) -> SessionResult<(String, u64)> {
        let clips = Self::editing_clips(&self.machine)?;
        if clips.get(clip_id).is_none() {
            return Err(SessionError::UnknownClip(clip_id.clone()));
        }
        let job_id = self.machine.job_id().unwrap_or_default().to_string();
        let generation = self.machine.generation();
        self.captions
            .entry(clip_id.clone())
            .or_insert_with(|| CaptionWorkflow::new(clip_id.clone()));
        Ok((job_id, generation))
    }

    /// Start caption generation for a clip. `false` when already running.
    pub fn generate_captions(&mut self, clip_id: &ClipId) -> SessionResult<bool> {
        let (job_id, generation) = self.caption_context(clip_id)?;
        let (Some(workflow), Some(clips)) = (self.captions.get_mut(clip_id), self.machine.clips())
        else {
            return Err(SessionError::UnknownClip(clip_id.clone()));
        };
        let Some(request) = workflow.begin_generate(clips, &job_id)? else {
            return Ok(false);
        };

        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let clip_id = clip_id.clone();
        tokio::spawn(async move {
            let result = service.generate_captions(&request).await;
            let _ = events.send(SessionEvent::CaptionsGenerated {
                generation,
                clip_id,
                result,
            });
        });
        Ok(true)
    }

    /// Change a clip's caption style.
    pub fn restyle_captions(&mut self, clip_id: &ClipId, style: CaptionStyle) -> SessionResult<()> {
        self.caption_context(clip_id)?;
        let (Some(workflow), Some(clips)) =
            (self.captions.get_mut(clip_id), self.machine.clips_mut())
        else {
            return Err(SessionError::UnknownClip(clip_id.clone()));
        };
        Ok(workflow.restyle(clips, style)?)
    }

    /// Change the text of one caption segment.
    pub fn edit_caption_text(
        &mut self,
        clip_id: &ClipId,
        index: usize,
        text: impl Into<String>,
    ) -> SessionResult<()> {
        self.caption_context(clip_id)?;
        let (Some(workflow), Some(clips)) =
            (self.captions.get_mut(clip_id), self.machine.clips_mut())
        else {
            return Err(SessionError::UnknownClip(clip_id.clone()));
        };
        Ok(workflow.edit_segment_text(clips, index, text)?)
    }

    /// Burn the clip's current captions in. `false` when a call is running.
    pub fn apply_captions(&mut self, clip_id: &ClipId) -> SessionResult<bool> {
        let (job_id, generation) = self.caption_context(clip_id)?;
        let (Some(workflow), Some(clips)) =
            (self.captions.get_mut(clip_id), self.machine.clips_mut())
        else {
            return Err(SessionError::UnknownClip(clip_id.clone()));
        };
        let Some(clip) = clips.get(clip_id) else {
            return Err(SessionError::UnknownClip(clip_id.clone()));
        };
        let segments = clip.captions().to_vec();
        let style = clip.caption_style().cloned().unwrap_or_default();
        let Some(request) = workflow.begin_apply(clips, &job_id, segments, style)? else {
            return Ok(false);
        };

        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let clip_id = clip_id.clone();
        tokio::spawn(async move {
            let result = service.apply_captions(&request).await;
            let _ = events.send(SessionEvent::CaptionsApplied {
                generation,
                clip_id,
                result,
            });
        });
        Ok(true)
    }

    pub fn caption_stage(&self, clip_id: &ClipId) -> CaptionStage {
        self.captions
            .get(clip_id)
            .map(CaptionWorkflow::stage)
            .unwrap_or_default()
    }

    pub fn caption_workflow(&self, clip_id: &ClipId) -> Option<&CaptionWorkflow> {
        self.captions.get(clip_id)
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn phase(&self) -> JobPhase {
        self.machine.phase()
    }

    pub fn machine(&self) -> &JobStateMachine {
        &self.machine
    }

    pub fn job_id(&self) -> Option<&str> {
        self.machine.job_id()
    }

    pub fn clips(&self) -> Option<&ClipCollection> {
        self.machine.clips()
    }

    pub fn finalized(&self) -> Option<&[FinalizedClip]> {
        self.machine.finalized()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.machine.error_message()
    }

    pub fn recovered_clips(&self) -> Option<&ClipCollection> {
        self.machine.recovered_clips()
    }

    pub fn take_recovered_clips(&mut self) -> Option<ClipCollection> {
        self.machine.take_recovered_clips()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn playback(&self) -> &PlaybackSynchronizer {
        &self.playback
    }

    /// Whether a status poll loop is running.
    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    pub fn is_finalizing(&self) -> bool {
        self.finalize_in_flight
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("id", &self.id)
            .field("phase", &self.machine.phase())
            .field("generation", &self.machine.generation())
            .field("polling", &self.poller.is_some())
            .finish()
    }
}
