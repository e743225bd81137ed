//! Job state machine.
//!
//! ```text
//! input ──submit──▶ processing ──poll:complete──▶ editing ──finalize──▶ finalizing ──▶ complete
//!   │                   │                            │                      │
//!   └───────────────────┴──────────── error ◀────────┴──────────────────────┘
//! ```
//!
//! Every transition bumps the generation. Results of external calls carry the
//! generation they were issued under and are dropped when it is stale.

use std::fmt;

use clipcut_service::{FinalizedClip, JobStatus, JobStatusResponse};
use clipcut_timeline::ClipCollection;
use tracing::{debug, info, warn};

use crate::error::TransitionError;

/// Fieldless view of [`JobState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    Input,
    Processing,
    Editing,
    Finalizing,
    Complete,
    Error,
}

impl JobPhase {
    pub const ALL: [JobPhase; 6] = [
        Self::Input,
        Self::Processing,
        Self::Editing,
        Self::Finalizing,
        Self::Complete,
        Self::Error,
    ];

    /// Whether a single transition leads from `self` to `next`.
    pub fn can_transition_to(self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (_, Input)
                | (Input, Processing)
                | (Input, Error)
                | (Processing, Editing)
                | (Processing, Error)
                | (Editing, Finalizing)
                | (Editing, Error)
                | (Finalizing, Complete)
                | (Finalizing, Error)
        )
    }

    /// Waiting on an external job.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Processing | Self::Finalizing)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Processing => "processing",
            Self::Editing => "editing",
            Self::Finalizing => "finalizing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Workflow state with the data each state owns.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Input,
    Processing {
        job_id: String,
    },
    Editing {
        job_id: String,
        clips: ClipCollection,
    },
    /// The edited collection is kept read-only until the finalize resolves.
    Finalizing {
        job_id: String,
        clips: ClipCollection,
    },
    Complete {
        job_id: String,
        clips: Vec<FinalizedClip>,
    },
    Error {
        job_id: Option<String>,
        message: String,
        /// Collection as it was when a finalize failed
        recovered: Option<ClipCollection>,
    },
}

impl JobState {
    pub fn phase(&self) -> JobPhase {
        match self {
            Self::Input => JobPhase::Input,
            Self::Processing { .. } => JobPhase::Processing,
            Self::Editing { .. } => JobPhase::Editing,
            Self::Finalizing { .. } => JobPhase::Finalizing,
            Self::Complete { .. } => JobPhase::Complete,
            Self::Error { .. } => JobPhase::Error,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::Input => None,
            Self::Processing { job_id }
            | Self::Editing { job_id, .. }
            | Self::Finalizing { job_id, .. }
            | Self::Complete { job_id, .. } => Some(job_id),
            Self::Error { job_id, .. } => job_id.as_deref(),
        }
    }
}

/// What a poll result did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDisposition {
    /// Issued under an older generation; ignored.
    Stale,
    /// The job is still running; stay in processing.
    Running,
    /// Clips were ingested; now editing.
    Ready,
    /// The job failed or its results were invalid; now in error.
    Failed,
}

/// Controller for one job's lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStateMachine {
    state: JobState,
    generation: u64,
    timeline_duration: Option<f64>,
    min_clip_length: Option<f64>,
}

impl Default for JobStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStateMachine {
    pub fn new() -> Self {
        Self {
            state: JobState::Input,
            generation: 0,
            timeline_duration: None,
            min_clip_length: None,
        }
    }

    /// Fix the timeline duration used at ingest instead of deriving it.
    pub fn with_timeline_duration(mut self, duration: Option<f64>) -> Self {
        self.timeline_duration = duration;
        self
    }

    /// Override the minimum clip length of ingested collections.
    pub fn with_min_clip_length(mut self, seconds: f64) -> Self {
        self.min_clip_length = Some(seconds);
        self
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn phase(&self) -> JobPhase {
        self.state.phase()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn job_id(&self) -> Option<&str> {
        self.state.job_id()
    }

    /// Whether `generation` is still current.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn transition(&mut self, next: JobState) -> u64 {
        self.transition_from(self.phase(), next)
    }

    fn transition_from(&mut self, from: JobPhase, next: JobState) -> u64 {
        let to = next.phase();
        debug_assert!(from.can_transition_to(to), "{from} -> {to}");
        self.state = next;
        self.generation += 1;
        info!(%from, %to, generation = self.generation, "Job transition");
        self.generation
    }

    fn require(&self, phase: JobPhase, action: &'static str) -> Result<(), TransitionError> {
        if self.phase() == phase {
            Ok(())
        } else {
            Err(TransitionError::new(self.phase(), action))
        }
    }

    // ── Submit ────────────────────────────────────────────────

    /// The service accepted the job. Returns the new generation, under which
    /// status polls must be issued.
    pub fn submit_accepted(&mut self, job_id: impl Into<String>) -> Result<u64, TransitionError> {
        self.require(JobPhase::Input, "accept a submission")?;
        Ok(self.transition(JobState::Processing {
            job_id: job_id.into(),
        }))
    }

    /// The service refused the job, or could not be reached.
    pub fn submit_rejected(&mut self, message: impl Into<String>) -> Result<u64, TransitionError> {
        self.require(JobPhase::Input, "reject a submission")?;
        Ok(self.transition(JobState::Error {
            job_id: None,
            message: message.into(),
            recovered: None,
        }))
    }

    // ── Polling ───────────────────────────────────────────────

    /// Apply a status poll issued under `generation`.
    pub fn apply_poll(
        &mut self,
        generation: u64,
        response: JobStatusResponse,
    ) -> Result<PollDisposition, TransitionError> {
        if !self.is_current(generation) {
            debug!(generation, current = self.generation, "Dropping stale poll result");
            return Ok(PollDisposition::Stale);
        }
        let JobState::Processing { job_id } = &self.state else {
            return Err(TransitionError::new(self.phase(), "apply a poll result"));
        };
        let job_id = job_id.clone();

        match response.status {
            JobStatus::Pending | JobStatus::Processing => {
                debug!(%job_id, message = %response.message, "Job still running");
                Ok(PollDisposition::Running)
            }
            JobStatus::Unknown => {
                warn!(%job_id, "Unrecognized job status, continuing to poll");
                Ok(PollDisposition::Running)
            }
            JobStatus::Failed => {
                self.transition(JobState::Error {
                    job_id: Some(job_id),
                    message: response.message,
                    recovered: None,
                });
                Ok(PollDisposition::Failed)
            }
            JobStatus::Complete => {
                let records = response.results.unwrap_or_default();
                match ClipCollection::ingest(&records, self.timeline_duration) {
                    Ok(clips) => {
                        let clips = match self.min_clip_length {
                            Some(len) => clips.with_min_clip_length(len),
                            None => clips,
                        };
                        info!(%job_id, clips = clips.len(), "Job complete, editing");
                        self.transition(JobState::Editing { job_id, clips });
                        Ok(PollDisposition::Ready)
                    }
                    Err(err) => {
                        warn!(%job_id, error = %err, "Job results failed validation");
                        self.transition(JobState::Error {
                            job_id: Some(job_id),
                            message: err.to_string(),
                            recovered: None,
                        });
                        Ok(PollDisposition::Failed)
                    }
                }
            }
        }
    }

    // ── Finalize ──────────────────────────────────────────────

    /// Stop editing and wait for a finalize. Returns the new generation,
    /// under which the finalize call must be issued.
    pub fn begin_finalize(&mut self) -> Result<u64, TransitionError> {
        let JobState::Editing { job_id, clips } = &self.state else {
            return Err(TransitionError::new(self.phase(), "finalize"));
        };
        let next = JobState::Finalizing {
            job_id: job_id.clone(),
            clips: clips.clone(),
        };
        Ok(self.transition(next))
    }

    /// Replace the collection with finalized output. Returns `false` when
    /// `generation` is stale.
    pub fn finalize_succeeded(
        &mut self,
        generation: u64,
        clips: Vec<FinalizedClip>,
    ) -> Result<bool, TransitionError> {
        if !self.is_current(generation) {
            return Ok(false);
        }
        let JobState::Finalizing { job_id, .. } = &self.state else {
            return Err(TransitionError::new(self.phase(), "complete a finalize"));
        };
        let job_id = job_id.clone();
        self.transition(JobState::Complete { job_id, clips });
        Ok(true)
    }

    /// Enter error, keeping the pre-finalize collection recoverable.
    /// Returns `false` when `generation` is stale.
    pub fn finalize_failed(
        &mut self,
        generation: u64,
        message: impl Into<String>,
    ) -> Result<bool, TransitionError> {
        if !self.is_current(generation) {
            return Ok(false);
        }
        self.require(JobPhase::Finalizing, "fail a finalize")?;
        self.fail(message)?;
        Ok(true)
    }

    // ── Failure and reset ─────────────────────────────────────

    /// Enter error from processing, editing or finalizing.
    ///
    /// An edited collection, if any, is kept recoverable.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<u64, TransitionError> {
        let from = self.phase();
        if from == JobPhase::Input || !from.can_transition_to(JobPhase::Error) {
            return Err(TransitionError::new(from, "fail"));
        }
        let (job_id, recovered) = match std::mem::replace(&mut self.state, JobState::Input) {
            JobState::Processing { job_id } => (Some(job_id), None),
            JobState::Editing { job_id, clips } | JobState::Finalizing { job_id, clips } => {
                (Some(job_id), Some(clips))
            }
            JobState::Input | JobState::Complete { .. } | JobState::Error { .. } => (None, None),
        };
        let message = message.into();
        warn!(%message, "Job failed");
        Ok(self.transition_from(
            from,
            JobState::Error {
                job_id,
                message,
                recovered,
            },
        ))
    }

    /// Like [`JobStateMachine::fail`], but ignored when `generation` is stale.
    pub fn fail_at(
        &mut self,
        generation: u64,
        message: impl Into<String>,
    ) -> Result<bool, TransitionError> {
        if !self.is_current(generation) {
            return Ok(false);
        }
        self.fail(message)?;
        Ok(true)
    }

    /// Discard everything and return to input. Allowed from every state.
    pub fn reset(&mut self) -> u64 {
        self.transition(JobState::Input)
    }

    // ── Accessors ─────────────────────────────────────────────

    /// The collection being edited (or held during finalize).
    pub fn clips(&self) -> Option<&ClipCollection> {
        match &self.state {
            JobState::Editing { clips, .. } | JobState::Finalizing { clips, .. } => Some(clips),
            _ => None,
        }
    }

    /// Mutable access to the collection; only while editing.
    pub fn clips_mut(&mut self) -> Option<&mut ClipCollection> {
        match &mut self.state {
            JobState::Editing { clips, .. } => Some(clips),
            _ => None,
        }
    }

    pub fn finalized(&self) -> Option<&[FinalizedClip]> {
        match &self.state {
            JobState::Complete { clips, .. } => Some(clips),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            JobState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The edited collection preserved by a failed finalize.
    pub fn recovered_clips(&self) -> Option<&ClipCollection> {
        match &self.state {
            JobState::Error { recovered, .. } => recovered.as_ref(),
            _ => None,
        }
    }

    /// Take ownership of the preserved collection, e.g. to retry manually.
    pub fn take_recovered_clips(&mut self) -> Option<ClipCollection> {
        match &mut self.state {
            JobState::Error { recovered, .. } => recovered.take(),
            _ => None,
        }
    }
}
