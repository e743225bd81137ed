//! In-memory processing service and session helpers shared by the
//! integration tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clipcut_core::EditorConfig;
use clipcut_service::{
    ApplyCaptionsRequest, ApplyCaptionsResponse, ClipService, FinalizeRequest, FinalizeResponse,
    FinalizedClip, GenerateCaptionsRequest, GenerateCaptionsResponse, JobStatus,
    JobStatusResponse, ProcessRequest, ProcessResponse, ServiceError, ServiceResult,
};
use clipcut_timeline::{CaptionSegment, ClipId};
use clipcut_workflow::{EditorSession, JobPhase};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// A scripted reply: a body, or an HTTP status with its error body.
pub type Reply<T> = Result<T, (u16, &'static str)>;

fn reply<T: Clone>(scripted: &Reply<T>) -> ServiceResult<T> {
    scripted.clone().map_err(|(code, body)| ServiceError::Status {
        code,
        body: body.to_string(),
    })
}

/// One recorded call against the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Submit(ProcessRequest),
    Status(String),
    Finalize(FinalizeRequest),
    Generate(GenerateCaptionsRequest),
    Apply(ApplyCaptionsRequest),
}

/// Processing service double.
///
/// Status replies are consumed in order; the last one repeats. With no
/// scripted finalize reply, every requested clip comes back finalized under
/// `/final/<id>.mp4`.
pub struct FakeService {
    submit: Mutex<Reply<ProcessResponse>>,
    statuses: Mutex<VecDeque<Reply<JobStatusResponse>>>,
    finalize: Mutex<Option<Reply<FinalizeResponse>>>,
    generate: Mutex<Reply<GenerateCaptionsResponse>>,
    apply: Mutex<Reply<ApplyCaptionsResponse>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            submit: Mutex::new(Ok(ProcessResponse {
                job_id: "job-1".into(),
                status: JobStatus::Pending,
                message: "queued".into(),
            })),
            statuses: Mutex::new(VecDeque::new()),
            finalize: Mutex::new(None),
            generate: Mutex::new(Ok(GenerateCaptionsResponse {
                captions: vec![
                    CaptionSegment::new(0.0, 2.0, "Hello there"),
                    CaptionSegment::new(2.0, 4.0, "general viewer"),
                ],
            })),
            apply: Mutex::new(Ok(ApplyCaptionsResponse::default())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A job that goes pending, then completes with [`records`].
    pub fn completing() -> Self {
        Self::new().with_statuses(vec![Ok(pending()), Ok(complete(records()))])
    }

    pub fn with_submit(self, submit: Reply<ProcessResponse>) -> Self {
        *self.submit.lock() = submit;
        self
    }

    pub fn with_statuses(self, statuses: Vec<Reply<JobStatusResponse>>) -> Self {
        *self.statuses.lock() = statuses.into();
        self
    }

    pub fn with_finalize(self, finalize: Reply<FinalizeResponse>) -> Self {
        *self.finalize.lock() = Some(finalize);
        self
    }

    pub fn with_generate(self, generate: Reply<GenerateCaptionsResponse>) -> Self {
        *self.generate.lock() = generate;
        self
    }

    pub fn with_apply(self, apply: Reply<ApplyCaptionsResponse>) -> Self {
        *self.apply.lock() = apply;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Status(_)))
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    pub fn finalize_requests(&self) -> Vec<FinalizeRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Finalize(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ClipService for FakeService {
    async fn submit_job(&self, request: &ProcessRequest) -> ServiceResult<ProcessResponse> {
        self.calls.lock().push(Call::Submit(request.clone()));
        reply(&self.submit.lock())
    }

    async fn job_status(&self, job_id: &str) -> ServiceResult<JobStatusResponse> {
        self.calls.lock().push(Call::Status(job_id.to_string()));
        let mut statuses = self.statuses.lock();
        let next = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        next.map_or_else(|| Ok(pending()), |r| reply(&r))
    }

    async fn finalize(&self, request: &FinalizeRequest) -> ServiceResult<FinalizeResponse> {
        self.calls.lock().push(Call::Finalize(request.clone()));
        if let Some(scripted) = self.finalize.lock().as_ref() {
            return reply(scripted);
        }
        let finalized_clips = request
            .clips
            .iter()
            .map(|c| {
                FinalizedClip::new(c.id.clone(), c.edited_start, c.edited_end)
                    .with_path(format!("/final/{}.mp4", c.id))
            })
            .collect();
        Ok(FinalizeResponse {
            status: "success".into(),
            message: None,
            finalized_clips,
        })
    }

    async fn generate_captions(
        &self,
        request: &GenerateCaptionsRequest,
    ) -> ServiceResult<GenerateCaptionsResponse> {
        self.calls.lock().push(Call::Generate(request.clone()));
        reply(&self.generate.lock())
    }

    async fn apply_captions(
        &self,
        request: &ApplyCaptionsRequest,
    ) -> ServiceResult<ApplyCaptionsResponse> {
        self.calls.lock().push(Call::Apply(request.clone()));
        reply(&self.apply.lock())
    }
}

// ── Fixtures ───────────────────────────────────────────────────

/// Two clips with a gap: `a` on 0-8s and `b` on 10-20s.
pub fn records() -> Vec<Value> {
    vec![
        json!({"id": "a", "start_time": 0.0, "end_time": 8.0, "title": "Opening", "path": "/clips/a.mp4"}),
        json!({"id": "b", "start_time": 10.0, "end_time": 20.0, "title": "Punchline", "path": "/clips/b.mp4"}),
    ]
}

pub fn pending() -> JobStatusResponse {
    JobStatusResponse {
        status: JobStatus::Processing,
        message: "working".into(),
        results: None,
    }
}

pub fn complete(results: Vec<Value>) -> JobStatusResponse {
    JobStatusResponse {
        status: JobStatus::Complete,
        message: "done".into(),
        results: Some(results),
    }
}

pub fn failed(message: &str) -> JobStatusResponse {
    JobStatusResponse {
        status: JobStatus::Failed,
        message: message.into(),
        results: None,
    }
}

pub fn id(s: &str) -> ClipId {
    ClipId::new(s)
}

/// Editor config with a fast poll loop.
pub fn config() -> EditorConfig {
    EditorConfig {
        poll_interval: Duration::from_millis(10),
        ..EditorConfig::default()
    }
}

pub fn session(service: &Arc<FakeService>) -> EditorSession {
    EditorSession::new(config(), Arc::clone(service) as Arc<dyn ClipService>)
}

/// Wait for the job to leave the busy phases, failing the test on a hang.
pub async fn settle(session: &mut EditorSession) -> JobPhase {
    tokio::time::timeout(Duration::from_secs(5), session.run_until_settled())
        .await
        .expect("session did not settle")
}

/// Wait for every outstanding call, caption calls included.
pub async fn idle(session: &mut EditorSession) -> JobPhase {
    tokio::time::timeout(Duration::from_secs(5), session.run_until_idle())
        .await
        .expect("session did not go idle")
}

/// A session in the editing phase over [`records`].
pub async fn editing(service: &Arc<FakeService>) -> EditorSession {
    let mut session = session(service);
    assert!(session.submit("https://video.example/long", "funny bits").unwrap());
    assert_eq!(settle(&mut session).await, JobPhase::Editing);
    session
}
