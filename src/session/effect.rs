//! Effects produced by state transitions

use super::card::AudioCue;
use serde::Serialize;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the backend to start a session
    StartSession {
        name: String,
        task_type: Option<String>,
    },

    /// Fetch the card at `index` (-1 for the intro card)
    FetchCard { index: i64 },

    /// Synthesize and play a listening cue
    PlayAudio { request: AudioRequest },

    /// Submit an answer for marking
    SubmitAnswer { submission: AnswerSubmission },

    /// Tell the backend the session completed; awaited before close
    NotifyEnd,

    /// Re-render the session
    Render,

    /// Show an inline error next to the controls
    ShowError { message: String },

    /// Leave the session screen
    Close,
}

/// Body of an audio synthesis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioRequest {
    pub content: String,
    /// Playback mode
    pub t: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl AudioRequest {
    pub fn from_cue(cue: AudioCue, mode: i64) -> Self {
        Self {
            content: cue.content,
            t: mode,
            voice: cue.voice,
        }
    }
}

/// Body of a marking request, bound to the displayed question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSubmission {
    pub q_type: String,
    /// Identity of the question card, not the session index
    pub idx: i64,
    pub answer: String,
}

impl Effect {
    pub fn show_error(message: impl Into<String>) -> Self {
        Effect::ShowError {
            message: message.into(),
        }
    }

    pub fn fetch_card(index: i64) -> Self {
        Effect::FetchCard { index }
    }
}
