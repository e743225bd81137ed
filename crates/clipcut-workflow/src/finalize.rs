//! Finalize request building and response reconciliation.

use clipcut_service::{FinalizeClip, FinalizeRequest, FinalizeResponse, FinalizedClip, ServiceResult};
use clipcut_timeline::ClipCollection;
use tracing::{info, warn};

use crate::error::FinalizeError;

/// Turns an edited collection into one batched finalize request and the
/// response into the finalized clip set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalizationCoordinator;

impl FinalizationCoordinator {
    /// Serialize every clip's edited bounds and caption data.
    pub fn build_request(job_id: &str, collection: &ClipCollection) -> FinalizeRequest {
        let clips = collection
            .iter()
            .map(|clip| FinalizeClip {
                id: clip.id().clone(),
                edited_start: clip.edited_start(),
                edited_end: clip.edited_end(),
                captions: (!clip.captions().is_empty()).then(|| clip.captions().to_vec()),
                caption_style: clip.caption_style().cloned(),
                has_captioned_version: clip
                    .media()
                    .is_some_and(|media| media.has_captioned_version()),
            })
            .collect();
        FinalizeRequest {
            job_id: job_id.to_string(),
            clips,
        }
    }

    /// Accept a successful response's clips; anything else is a failure.
    pub fn reconcile(response: FinalizeResponse) -> Result<Vec<FinalizedClip>, FinalizeError> {
        if !response.is_success() {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Finalize failed with status {:?}", response.status));
            warn!(%message, "Finalize rejected");
            return Err(FinalizeError::Rejected(message));
        }
        info!(clips = response.finalized_clips.len(), "Finalize succeeded");
        Ok(response.finalized_clips)
    }

    /// [`FinalizationCoordinator::reconcile`] for a call that may itself
    /// have failed. Transport failures and rejections are treated alike.
    pub fn reconcile_result(
        result: ServiceResult<FinalizeResponse>,
    ) -> Result<Vec<FinalizedClip>, FinalizeError> {
        match result {
            Ok(response) => Self::reconcile(response),
            Err(err) => {
                warn!(error = %err, "Finalize call failed");
                Err(FinalizeError::Transport(err.user_message()))
            }
        }
    }
}
