//! ClipCut Workflow - Drives one clip-extraction job from submit to finalize
//!
//! Provides:
//! - The job state machine (input → processing → editing → finalizing → complete/error)
//! - A status poll task bound to the processing state
//! - Finalize request building and response reconciliation
//! - An event-driven editor session tying everything together

pub mod error;
pub mod event;
pub mod finalize;
pub mod job;
pub mod poller;
pub mod session;

pub use error::{FinalizeError, SessionError, SessionResult, TransitionError};
pub use event::SessionEvent;
pub use finalize::FinalizationCoordinator;
pub use job::{JobPhase, JobState, JobStateMachine, PollDisposition};
pub use poller::PollTask;
pub use session::EditorSession;
