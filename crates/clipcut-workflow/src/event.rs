//! Completions of external calls, delivered to the session's own task.

use clipcut_service::{
    ApplyCaptionsResponse, FinalizeResponse, GenerateCaptionsResponse, JobStatusResponse,
    ProcessResponse, ServiceResult,
};
use clipcut_timeline::ClipId;

/// One finished external call.
///
/// Every event carries the job generation it was issued under; the session
/// drops events whose generation is no longer current.
#[derive(Debug)]
pub enum SessionEvent {
    Submitted {
        generation: u64,
        result: ServiceResult<ProcessResponse>,
    },
    Polled {
        generation: u64,
        result: ServiceResult<JobStatusResponse>,
    },
    Finalized {
        generation: u64,
        result: ServiceResult<FinalizeResponse>,
    },
    CaptionsGenerated {
        generation: u64,
        clip_id: ClipId,
        result: ServiceResult<GenerateCaptionsResponse>,
    },
    CaptionsApplied {
        generation: u64,
        clip_id: ClipId,
        result: ServiceResult<ApplyCaptionsResponse>,
    },
}

impl SessionEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Submitted { generation, .. }
            | Self::Polled { generation, .. }
            | Self::Finalized { generation, .. }
            | Self::CaptionsGenerated { generation, .. }
            | Self::CaptionsApplied { generation, .. } => *generation,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submit",
            Self::Polled { .. } => "poll",
            Self::Finalized { .. } => "finalize",
            Self::CaptionsGenerated { .. } => "captions/generate",
            Self::CaptionsApplied { .. } => "captions/apply",
        }
    }
}
