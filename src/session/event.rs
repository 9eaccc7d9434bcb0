//! Events that can occur in a session

use super::card::{Card, MarkResult};
use crate::api::ApiError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// Fetch the introductory card before starting
    Preview,
    /// Primary control while not started
    Start,
    /// Primary control on a non-question card, a marked card, or after a failed fetch
    Next,
    Submit {
        answer: String,
    },
    /// Resubmit the kept draft after a marking failure, or re-issue a failed fetch
    Retry,
    /// Re-fetch the current card, keeping the last mark
    Refresh,
    /// Final control on the completion screen
    Dismiss,

    // Backend events
    Started,
    StartFailed {
        error: ApiError,
    },
    CardFetched {
        index: i64,
        card: Card,
    },
    FetchFailed {
        index: i64,
        error: ApiError,
    },
    AudioFinished {
        outcome: AudioOutcome,
    },
    AnswerMarked {
        result: MarkResult,
    },
    MarkFailed {
        error: ApiError,
    },
    EndNotified,
}

impl Event {
    /// User events are rejected while a call is outstanding
    pub fn is_user_action(&self) -> bool {
        matches!(
            self,
            Event::Preview
                | Event::Start
                | Event::Next
                | Event::Submit { .. }
                | Event::Retry
                | Event::Refresh
                | Event::Dismiss
        )
    }
}

/// How a listening cue ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutcome {
    Played,
    /// Synthesis or playback failed; the question is answerable anyway
    Degraded { reason: String },
}
