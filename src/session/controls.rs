//! Mapping typed lines to session events

use super::{Event, Session, SessionState};

/// Interpret a line typed at the prompt.
///
/// Slash commands reach the secondary controls. On an open question any
/// other line is the answer, including an empty one. Otherwise the line
/// presses the primary control.
pub fn interpret(session: &Session, line: &str) -> Event {
    match line.trim() {
        "/retry" => return Event::Retry,
        "/refresh" => return Event::Refresh,
        "/preview" => return Event::Preview,
        "/next" => return Event::Next,
        _ => {}
    }

    if session.state.open_question().is_some() {
        return Event::Submit {
            answer: line.to_string(),
        };
    }

    match session.state {
        SessionState::NotStarted | SessionState::Previewing { .. } => Event::Start,
        SessionState::Ended => Event::Dismiss,
        SessionState::AwaitingConfirmation { .. } | SessionState::ReadyForNext { .. } => Event::Next,
    }
}
