//! ClipCut Service - External collaborators of the editor
//!
//! Wire types and an HTTP client for:
//! - Job submission and status polling on the analysis pipeline
//! - Batched finalize (re-encoding of edited clips)
//! - Caption generation and burn-in

pub mod client;
pub mod error;
pub mod types;

pub use client::{ClipService, HttpClipService, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use types::{
    ApplyCaptionsRequest, ApplyCaptionsResponse, FinalizeClip, FinalizeRequest, FinalizeResponse,
    FinalizedClip, GenerateCaptionsRequest, GenerateCaptionsResponse, JobStatus,
    JobStatusResponse, ProcessRequest, ProcessResponse,
};
