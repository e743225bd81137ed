//! Caption calls fanned out over every clip.
//!
//! A clip that refuses a call is logged and skipped so the rest of the run
//! still goes through.

use clipcut_timeline::ClipId;
use clipcut_workflow::EditorSession;
use tracing::warn;

/// Start caption generation for each clip. Returns how many calls started.
pub fn generate_all(session: &mut EditorSession, ids: &[ClipId]) -> usize {
    let mut started = 0;
    for id in ids {
        match session.generate_captions(id) {
            Ok(true) => started += 1,
            Ok(false) => {}
            Err(err) => warn!(clip = %id, error = %err, "Skipping caption generation"),
        }
    }
    started
}

/// Start caption burn-in for each clip. Returns how many calls started.
pub fn apply_all(session: &mut EditorSession, ids: &[ClipId]) -> usize {
    let mut started = 0;
    for id in ids {
        match session.apply_captions(id) {
            Ok(true) => started += 1,
            Ok(false) => {}
            Err(err) => warn!(clip = %id, error = %err, "Skipping caption apply"),
        }
    }
    started
}
