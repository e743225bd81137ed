//! Job status polling bound to the processing state.

use std::sync::Arc;
use std::time::Duration;

use clipcut_service::ClipService;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::event::SessionEvent;

/// A running status poll loop for one job.
///
/// Polls once immediately, then every `interval`, forwarding each result as
/// [`SessionEvent::Polled`]. Dropping the task aborts the loop.
#[derive(Debug)]
pub struct PollTask {
    handle: JoinHandle<()>,
    job_id: String,
}

impl PollTask {
    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(
        service: Arc<dyn ClipService>,
        job_id: String,
        generation: u64,
        interval: Duration,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        let id = job_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!(job_id = %id, generation, "Polling job status");
                let result = service.job_status(&id).await;
                if events.send(SessionEvent::Polled { generation, result }).is_err() {
                    break;
                }
            }
        });
        Self { handle, job_id }
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        debug!(job_id = %self.job_id, "Stopping status poll");
        self.handle.abort();
    }
}
