//! Integration tests for timeline interaction during editing.
//!
//! Pointer gestures go through the session, so hit testing, selection,
//! dragging and seek suppression are exercised together. The fixture
//! timeline is 20s on a 200px strip: 10px per second.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clipcut_timeline::{
    DragMode, ListenerRegistration, PointerListeners, PressOutcome, SeekOutcome, TimelineGeometry,
};
use clipcut_workflow::{EditorSession, JobPhase, SessionError};

use crate::fake::{self, id, FakeService};

// ── Helpers ────────────────────────────────────────────────────

#[derive(Default)]
struct CountingListeners {
    attached: AtomicUsize,
    detached: Arc<AtomicUsize>,
}

impl PointerListeners for CountingListeners {
    fn attach(&self) -> ListenerRegistration {
        self.attached.fetch_add(1, Ordering::SeqCst);
        let detached = Arc::clone(&self.detached);
        ListenerRegistration::new(move || {
            detached.fetch_add(1, Ordering::SeqCst);
        })
    }
}

impl CountingListeners {
    fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    fn detached(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }
}

async fn editing() -> (Arc<FakeService>, EditorSession, TimelineGeometry) {
    let service = Arc::new(FakeService::completing());
    let session = fake::editing(&service).await;
    let geometry = session.geometry(200.0).unwrap();
    (service, session, geometry)
}

fn bounds(session: &EditorSession, clip: &str) -> (f64, f64) {
    let clip = session.clips().unwrap().get(&id(clip)).unwrap();
    (clip.edited_start(), clip.edited_end())
}

// ── Dragging ───────────────────────────────────────────────────

#[tokio::test]
async fn right_edge_stops_at_neighbour() {
    let (_service, mut session, geometry) = editing().await;
    let listeners = CountingListeners::default();

    let outcome = session.pointer_down(&geometry, 79.0, &listeners).unwrap();
    assert_eq!(outcome, PressOutcome::Started(DragMode::TrimEnd));

    assert!(session.pointer_move(&geometry, 200.0));
    assert_eq!(bounds(&session, "a"), (0.0, 10.0));

    // Pushing further changes nothing
    assert!(!session.pointer_move(&geometry, 250.0));
    assert_eq!(bounds(&session, "a"), (0.0, 10.0));
    assert_eq!(bounds(&session, "b"), (10.0, 20.0));

    assert_eq!(session.pointer_up(Instant::now()), Some(id("a")));
    assert!(session.clips().unwrap().check_invariants().is_ok());
}

#[tokio::test]
async fn trim_start_keeps_minimum_length() {
    let (_service, mut session, geometry) = editing().await;
    let listeners = CountingListeners::default();

    let outcome = session.pointer_down(&geometry, 1.0, &listeners).unwrap();
    assert_eq!(outcome, PressOutcome::Started(DragMode::TrimStart));
    session.pointer_move(&geometry, 190.0);
    assert_eq!(bounds(&session, "a"), (7.0, 8.0));
}

#[tokio::test]
async fn press_on_other_clip_selects_it_first() {
    let (_service, mut session, geometry) = editing().await;
    let listeners = CountingListeners::default();

    let outcome = session.pointer_down(&geometry, 150.0, &listeners).unwrap();
    assert_eq!(outcome, PressOutcome::Select(id("b")));
    assert!(!session.drag().is_dragging());
    assert_eq!(listeners.attached(), 0);
    assert_eq!(session.playback().selected_index(), Some(1));
    assert_eq!(session.playback().preview_asset(), Some("/clips/b.mp4"));

    // Now selected, the same press moves it
    let outcome = session.pointer_down(&geometry, 150.0, &listeners).unwrap();
    assert_eq!(outcome, PressOutcome::Started(DragMode::Move));
    session.pointer_move(&geometry, 50.0);
    assert_eq!(bounds(&session, "b"), (8.0, 18.0));
}

#[tokio::test]
async fn release_detaches_listeners_once() {
    let (_service, mut session, geometry) = editing().await;
    let listeners = CountingListeners::default();

    session.pointer_down(&geometry, 40.0, &listeners).unwrap();
    assert_eq!(listeners.attached(), 1);
    assert_eq!(listeners.detached(), 0);

    // A second press during the gesture is ignored
    let outcome = session.pointer_down(&geometry, 40.0, &listeners).unwrap();
    assert_eq!(outcome, PressOutcome::Ignored);
    assert_eq!(listeners.attached(), 1);

    session.pointer_up(Instant::now());
    assert_eq!(listeners.detached(), 1);
    assert_eq!(session.pointer_up(Instant::now()), None);
    assert_eq!(listeners.detached(), 1);
}

#[tokio::test]
async fn press_on_gap_is_ignored() {
    let (_service, mut session, geometry) = editing().await;
    let listeners = CountingListeners::default();
    let outcome = session.pointer_down(&geometry, 90.0, &listeners).unwrap();
    assert_eq!(outcome, PressOutcome::Ignored);
}

#[tokio::test]
async fn finalize_cancels_active_drag() {
    let (service, mut session, geometry) = editing().await;
    let listeners = CountingListeners::default();

    session.pointer_down(&geometry, 40.0, &listeners).unwrap();
    session.pointer_move(&geometry, 60.0);
    assert!(session.drag().is_dragging());

    session.finalize().unwrap();
    assert!(!session.drag().is_dragging());
    assert_eq!(listeners.detached(), 1);

    assert_eq!(fake::settle(&mut session).await, JobPhase::Complete);
    let request = &service.finalize_requests()[0];
    // The 2s move landed before finalize: 0-8 became 2-10
    assert_eq!(request.clips[0].edited_start, 2.0);
    assert_eq!(request.clips[0].edited_end, 10.0);
}

#[tokio::test]
async fn trimmed_clip_keeps_captions_inside_it() {
    let service = Arc::new(FakeService::completing().with_generate(Err((503, ""))));
    let mut session = fake::editing(&service).await;
    let geometry = session.geometry(200.0).unwrap();
    let listeners = CountingListeners::default();
    let b = id("b");

    // Demo captions spread over b's 10s: 2.5s each
    session.generate_captions(&b).unwrap();
    fake::idle(&mut session).await;
    assert_eq!(session.clips().unwrap().get(&b).unwrap().captions().len(), 4);

    session.select_clip(1).unwrap();
    let outcome = session.pointer_down(&geometry, 199.0, &listeners).unwrap();
    assert_eq!(outcome, PressOutcome::Started(DragMode::TrimEnd));
    assert!(session.pointer_move(&geometry, 149.0));
    session.pointer_up(Instant::now());
    assert_eq!(bounds(&session, "b"), (10.0, 15.0));

    let clip = session.clips().unwrap().get(&b).unwrap();
    assert_eq!(clip.captions().len(), 2);
    assert_eq!(clip.captions()[1].end, 5.0);
    assert!(session.clips().unwrap().check_invariants().is_ok());

    session.finalize().unwrap();
    assert_eq!(fake::settle(&mut session).await, JobPhase::Complete);
    let request = &service.finalize_requests()[0];
    let sent = request.clips[1].captions.as_ref().unwrap();
    let duration = request.clips[1].edited_end - request.clips[1].edited_start;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|s| s.fits_within(duration)));
}

// ── Playback ───────────────────────────────────────────────────

#[tokio::test]
async fn seek_is_suppressed_right_after_drag() {
    let (_service, mut session, geometry) = editing().await;
    let listeners = CountingListeners::default();

    session.pointer_down(&geometry, 40.0, &listeners).unwrap();
    let released = Instant::now();
    session.pointer_up(released);

    assert_eq!(
        session.timeline_seek(0.25, released + Duration::from_millis(50)),
        SeekOutcome::Ignored
    );
    assert_eq!(
        session.timeline_seek(0.25, released + Duration::from_millis(200)),
        SeekOutcome::AssetSeek {
            time: 5.0,
            local: 5.0
        }
    );
    // Outside the selected clip only the cursor moves
    assert_eq!(
        session.timeline_seek(0.75, released + Duration::from_millis(200)),
        SeekOutcome::CursorOnly { time: 15.0 }
    );
}

#[tokio::test]
async fn preview_time_maps_onto_selected_clip() {
    let (_service, mut session, _geometry) = editing().await;

    let swap = session.select_clip(1).unwrap().unwrap();
    assert_eq!(swap.clip_id, id("b"));
    assert_eq!(swap.asset.as_deref(), Some("/clips/b.mp4"));
    assert_eq!(session.playback().current_time(), 10.0);

    assert_eq!(session.preview_time(2.5), 12.5);
    assert!(session.select_clip(5).unwrap().is_none());
}

#[tokio::test]
async fn interaction_requires_editing_phase() {
    let service = Arc::new(FakeService::completing());
    let mut session = fake::session(&service);
    let listeners = CountingListeners::default();

    assert!(session.geometry(200.0).is_none());
    assert!(matches!(
        session.select_clip(0).unwrap_err(),
        SessionError::Transition(_)
    ));
    let geometry = TimelineGeometry::new(200.0, 20.0);
    assert!(session.pointer_down(&geometry, 10.0, &listeners).is_err());
    assert!(!session.pointer_move(&geometry, 20.0));
    assert_eq!(session.timeline_seek(0.5, Instant::now()), SeekOutcome::Ignored);
}
