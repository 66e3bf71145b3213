//! # recovery-aid-core
//!
//! The submission state machine that ties the questionnaire to the advice
//! service.
//!
//! ```text
//! Idle -> Validating -> BuildingRequest -> AwaitingResponse -> Done
//!            |                |                  |
//!            +-------> Idle <-+------------------+
//! ```
//!
//! A failed submission always returns to `Idle` with the answers untouched.
//! Once `Done`, the session rejects further edits and submissions.

mod error;
mod session;
mod state;
mod view;

pub use error::SessionError;
pub use session::{IntakeSession, ServiceHandle};
pub use state::SubmitState;
pub use view::{QuestionView, SessionSnapshot};
