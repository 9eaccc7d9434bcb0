//! Runtime for executing quiz sessions
//!
//! Owns the session, feeds user input and backend replies through the pure
//! transition function, and performs the resulting effects.

mod executor;


pub use executor::SessionRuntime;

use crate::session::Session;
use tokio::task::JoinHandle;

/// Input from the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line typed at the prompt
    Line(String),
    /// Ctrl-C
    Interrupt,
    /// The input stream closed
    Closed,
}

/// Updates published to the front end
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// The session changed and should be redrawn
    Render { session: Session },
    /// Inline error from a failed request
    Error { message: String },
    /// Informational message, e.g. a rejected action
    Notice { message: String },
}

/// How a runtime finished
#[derive(Debug)]
pub enum RunOutcome {
    /// The completion screen was dismissed
    Completed,
    /// The user left early. `quit` is the unacknowledged quit notification.
    Abandoned { quit: Option<JoinHandle<()>> },
}
