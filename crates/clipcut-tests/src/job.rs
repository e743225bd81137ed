//! Integration tests for the job lifecycle.
//!
//! Drives an [`EditorSession`] through submit, polling, finalize and reset
//! against the in-memory service.

use std::sync::Arc;
use std::time::Duration;

use clipcut_service::{FinalizeResponse, HttpClipService, JobStatus, ProcessResponse, ServiceConfig};
use clipcut_workflow::{EditorSession, JobPhase, SessionError};
use serde_json::json;

use crate::fake::{self, complete, failed, id, pending, Call, FakeService};

// ── Submit & poll ──────────────────────────────────────────────

#[tokio::test]
async fn submit_polls_until_clips_arrive() {
    let service = Arc::new(
        FakeService::new().with_statuses(vec![
            Ok(pending()),
            Ok(pending()),
            Ok(complete(fake::records())),
        ]),
    );
    let session = fake::editing(&service).await;

    assert_eq!(session.job_id(), Some("job-1"));
    assert!(!session.is_polling());
    assert_eq!(service.status_calls(), 3);

    let clips = session.clips().unwrap();
    assert_eq!(clips.len(), 2);
    assert_eq!(clips.timeline_duration(), 20.0);
    assert_eq!(clips.get(&id("b")).unwrap().title.as_deref(), Some("Punchline"));

    // First clip is selected for preview
    assert_eq!(session.playback().selected_index(), Some(0));
    assert_eq!(session.playback().preview_asset(), Some("/clips/a.mp4"));

    match &service.calls()[0] {
        Call::Submit(req) => {
            assert_eq!(req.url, "https://video.example/long");
            assert_eq!(req.prompt, "funny bits");
        }
        other => panic!("expected submit first, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_submit_is_ignored() {
    let service = Arc::new(FakeService::completing());
    let mut session = fake::session(&service);

    assert!(session.submit("u", "p").unwrap());
    assert!(!session.submit("u", "p").unwrap());
    assert_eq!(fake::settle(&mut session).await, JobPhase::Editing);
    assert_eq!(service.count(|c| matches!(c, Call::Submit(_))), 1);
}

#[tokio::test]
async fn submit_outside_input_is_rejected() {
    let service = Arc::new(FakeService::completing());
    let mut session = fake::editing(&service).await;

    let err = session.submit("u", "p").unwrap_err();
    assert!(matches!(err, SessionError::Transition(_)));
    assert_eq!(session.phase(), JobPhase::Editing);
}

#[tokio::test]
async fn failed_job_message_is_shown_verbatim() {
    let service = Arc::new(FakeService::new().with_statuses(vec![Ok(pending()), Ok(failed("x"))]));
    let mut session = fake::session(&service);
    session.submit("u", "p").unwrap();

    assert_eq!(fake::settle(&mut session).await, JobPhase::Error);
    assert_eq!(session.error_message(), Some("x"));
    assert!(!session.is_polling());
    assert!(session.clips().is_none());
}

#[tokio::test]
async fn rejected_submit_uses_service_detail() {
    let service = Arc::new(
        FakeService::new().with_submit(Err((422, r#"{"detail": "Unsupported video URL"}"#))),
    );
    let mut session = fake::session(&service);
    session.submit("ftp://nope", "p").unwrap();

    assert_eq!(fake::settle(&mut session).await, JobPhase::Error);
    assert_eq!(session.error_message(), Some("Unsupported video URL"));
    assert_eq!(service.status_calls(), 0);
}

#[tokio::test]
async fn failed_submit_status_enters_error() {
    let service = Arc::new(FakeService::new().with_submit(Ok(ProcessResponse {
        job_id: String::new(),
        status: JobStatus::Failed,
        message: "queue full".into(),
    })));
    let mut session = fake::session(&service);
    session.submit("u", "p").unwrap();

    assert_eq!(fake::settle(&mut session).await, JobPhase::Error);
    assert_eq!(session.error_message(), Some("queue full"));
}

#[tokio::test]
async fn unreachable_service_reports_network_error() {
    // Nothing listens on the discard port
    let service = HttpClipService::new(ServiceConfig::new("http://127.0.0.1:9")).unwrap();
    let mut session = EditorSession::new(fake::config(), Arc::new(service));
    session.submit("u", "p").unwrap();

    let phase = tokio::time::timeout(Duration::from_secs(30), session.run_until_settled())
        .await
        .unwrap();
    assert_eq!(phase, JobPhase::Error);
    assert!(session.error_message().unwrap().starts_with("Network error"));
}

#[tokio::test]
async fn invalid_results_enter_error() {
    let service = Arc::new(FakeService::new().with_statuses(vec![Ok(complete(vec![
        json!({"id": "a", "start_time": 5.0, "end_time": 2.0}),
    ]))]));
    let mut session = fake::session(&service);
    session.submit("u", "p").unwrap();

    assert_eq!(fake::settle(&mut session).await, JobPhase::Error);
    assert!(!session.error_message().unwrap().is_empty());
    assert!(session.clips().is_none());
}

#[tokio::test]
async fn empty_results_give_empty_timeline() {
    let service = Arc::new(FakeService::new().with_statuses(vec![Ok(complete(vec![]))]));
    let session = fake::editing(&service).await;
    assert!(session.clips().unwrap().is_empty());
    assert_eq!(session.playback().selected_index(), None);
}

// ── Finalize ───────────────────────────────────────────────────

#[tokio::test]
async fn finalize_replaces_collection() {
    let service = Arc::new(FakeService::completing());
    let mut session = fake::editing(&service).await;

    assert!(session.finalize().unwrap());
    assert!(session.is_finalizing());
    assert!(!session.finalize().unwrap());
    assert_eq!(session.phase(), JobPhase::Finalizing);

    assert_eq!(fake::settle(&mut session).await, JobPhase::Complete);
    assert_eq!(service.finalize_requests().len(), 1);

    let request = &service.finalize_requests()[0];
    assert_eq!(request.job_id, "job-1");
    assert_eq!(request.clips.len(), 2);
    assert_eq!(request.clips[1].edited_start, 10.0);
    assert_eq!(request.clips[1].edited_end, 20.0);
    assert!(!request.clips[0].has_captioned_version);

    let finalized = session.finalized().unwrap();
    assert_eq!(finalized.len(), 2);
    assert_eq!(finalized[0].path(), Some("/final/a.mp4"));
    assert_eq!(finalized[1].formatted_start(), "00:10");
    assert!(session.clips().is_none());
    assert_eq!(session.playback().selected_index(), None);
}

#[tokio::test]
async fn finalize_failure_keeps_edited_clips() {
    let service = Arc::new(FakeService::completing().with_finalize(Ok(FinalizeResponse {
        status: "error".into(),
        message: Some("disk full".into()),
        finalized_clips: vec![],
    })));
    let mut session = fake::editing(&service).await;
    session.finalize().unwrap();

    assert_eq!(fake::settle(&mut session).await, JobPhase::Error);
    assert_eq!(session.error_message(), Some("disk full"));
    assert!(!session.is_finalizing());
    assert_eq!(session.recovered_clips().unwrap().len(), 2);

    let recovered = session.take_recovered_clips().unwrap();
    assert!(recovered.get(&id("a")).is_some());
    assert!(session.take_recovered_clips().is_none());
}

#[tokio::test]
async fn finalize_transport_error_is_reported() {
    let service = Arc::new(FakeService::completing().with_finalize(Err((502, ""))));
    let mut session = fake::editing(&service).await;
    session.finalize().unwrap();

    assert_eq!(fake::settle(&mut session).await, JobPhase::Error);
    assert_eq!(session.error_message(), Some("Request failed with status 502"));
}

#[tokio::test]
async fn finalize_requires_editing() {
    let service = Arc::new(FakeService::completing());
    let mut session = fake::session(&service);
    assert!(matches!(
        session.finalize().unwrap_err(),
        SessionError::Transition(_)
    ));
    assert!(service.calls().is_empty());
}

// ── Reset & stale results ──────────────────────────────────────

#[tokio::test]
async fn reset_drops_inflight_submit() {
    let service = Arc::new(FakeService::completing());
    let mut session = fake::session(&service);
    session.submit("u", "p").unwrap();
    session.reset();

    let event = tokio::time::timeout(Duration::from_secs(5), session.next_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.kind(), "submit");
    session.handle_event(event);

    assert_eq!(session.phase(), JobPhase::Input);
    assert!(!session.is_polling());
    assert_eq!(service.status_calls(), 0);
}

#[tokio::test]
async fn poller_stops_after_reset() {
    let service = Arc::new(FakeService::new());
    let mut session = fake::session(&service);
    session.submit("u", "p").unwrap();

    while service.status_calls() < 3 {
        let event = tokio::time::timeout(Duration::from_secs(5), session.next_event())
            .await
            .unwrap()
            .unwrap();
        session.handle_event(event);
    }
    assert!(session.is_polling());

    session.reset();
    let calls = service.status_calls();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(service.status_calls(), calls);

    // Polls that completed before the reset are stale now
    session.pump();
    assert_eq!(session.phase(), JobPhase::Input);
}

#[tokio::test]
async fn session_can_start_over_after_error() {
    let service = Arc::new(FakeService::new().with_statuses(vec![Ok(failed("x"))]));
    let mut session = fake::session(&service);
    session.submit("u", "p").unwrap();
    assert_eq!(fake::settle(&mut session).await, JobPhase::Error);

    session.reset();
    assert_eq!(session.phase(), JobPhase::Input);
    assert!(session.error_message().is_none());
    assert!(session.submit("u", "p").unwrap());
}
