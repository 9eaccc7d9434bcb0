//! Quiz session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

pub mod card;
pub mod controls;
mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use card::{Card, MarkResult, QuestionCard};
pub use controls::interpret;
pub use effect::{AnswerSubmission, AudioRequest, Effect};
pub use event::{AudioOutcome, Event};
pub use state::{Lifecycle, Pending, Session, SessionContext, SessionState};
pub use transition::{transition, TransitionError, TransitionResult};
