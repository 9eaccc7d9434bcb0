//! Session state types

use super::card::{Card, MarkResult, QuestionCard};

// ============================================================================
// Session State
// ============================================================================

/// Where the session is in its linear flow
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Waiting for the user to start
    #[default]
    NotStarted,

    /// Intro card fetched with index -1 before the session was started
    Previewing { card: Card },

    /// A card is displayed and waits for confirmation (next or an answer).
    /// `card` is empty until the first fetch after start succeeds.
    AwaitingConfirmation { card: Option<Card> },

    /// The current card has been confirmed; the next click advances
    ReadyForNext {
        card: Card,
        /// Survives a refresh of the same card
        mark: Option<MarkResult>,
    },

    /// An end card was received
    Ended,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::NotStarted | SessionState::Previewing { .. } => "not_started",
            SessionState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            SessionState::ReadyForNext { .. } => "ready_for_next",
            SessionState::Ended => "ended",
        }
    }

    /// The card currently on screen
    pub fn card(&self) -> Option<&Card> {
        match self {
            SessionState::Previewing { card } | SessionState::ReadyForNext { card, .. } => {
                Some(card)
            }
            SessionState::AwaitingConfirmation { card } => card.as_ref(),
            SessionState::NotStarted | SessionState::Ended => None,
        }
    }

    /// The question awaiting an answer, if any
    pub fn open_question(&self) -> Option<&QuestionCard> {
        match self {
            SessionState::AwaitingConfirmation { card: Some(card) } => card.as_question(),
            _ => None,
        }
    }

    pub fn mark(&self) -> Option<&MarkResult> {
        match self {
            SessionState::ReadyForNext { mark, .. } => mark.as_ref(),
            _ => None,
        }
    }

    pub fn is_not_started(&self) -> bool {
        matches!(
            self,
            SessionState::NotStarted | SessionState::Previewing { .. }
        )
    }
}

/// Server-facing lifecycle of the session, observed by the unload guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// No start has succeeded yet
    #[default]
    Inactive,
    /// Started; neither end nor quit has been issued
    Active,
    /// The end notification has been initiated
    EndInitiated,
    /// The end notification has completed
    Finished,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        self == Lifecycle::Active
    }
}

/// The one network call the session is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Start,
    Fetch { index: i64 },
    Audio,
    Mark { question_idx: i64 },
    End,
}

/// A single client-tracked learning run
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Position in the server-side card sequence, -1 before the first card
    pub index: i64,
    pub state: SessionState,
    pub lifecycle: Lifecycle,
    /// Outstanding network call; user actions are rejected while set
    pub pending: Option<Pending>,
    /// The answer last submitted for the current question
    pub draft: String,
    /// The call whose failure is on screen; what a retry re-issues
    pub last_failed: Option<Pending>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            index: -1,
            state: SessionState::NotStarted,
            lifecycle: Lifecycle::Inactive,
            pending: None,
            draft: String::new(),
            last_failed: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the answer input and primary control accept user actions
    pub fn controls_enabled(&self) -> bool {
        !self.is_busy() && self.lifecycle != Lifecycle::Finished
    }

    /// Label of the primary control for the current state
    pub fn primary_label(&self) -> &'static str {
        match &self.state {
            SessionState::NotStarted | SessionState::Previewing { .. } => "I am ready",
            SessionState::AwaitingConfirmation { card: Some(Card::Question(_)) } => "Confirm ✅",
            SessionState::AwaitingConfirmation { card: None } => "Retry 🔄",
            SessionState::AwaitingConfirmation { .. } | SessionState::ReadyForNext { .. } => {
                "Next ➡️"
            }
            SessionState::Ended => "Finish",
        }
    }
}

/// Immutable configuration for one session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Task name sent with the start request
    pub task_name: String,
    pub task_type: Option<String>,
    /// Playback mode (`t`) sent with audio requests
    pub audio_mode: i64,
}

/// Playback mode requested for listening cues
pub const DEFAULT_AUDIO_MODE: i64 = 2;

impl SessionContext {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            task_type: None,
            audio_mode: DEFAULT_AUDIO_MODE,
        }
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }
}
