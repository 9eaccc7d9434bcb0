//! Cards served by the quiz backend and the marking result

/// Question type tag the backend uses for listening exercises
pub const LISTENING_QUESTION: &str = "ListeningQuestion";

/// One unit of session content
#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Intro {
        content: String,
    },
    Learn {
        /// Sent by the backend as `abstract`
        summary: String,
        content: String,
        images: Vec<String>,
    },
    Question(QuestionCard),
    /// Session completion marker
    End,
}

impl Card {
    pub fn kind(&self) -> &'static str {
        match self {
            Card::Intro { .. } => "intro",
            Card::Learn { .. } => "learn",
            Card::Question(_) => "question",
            Card::End => "end",
        }
    }

    pub fn as_question(&self) -> Option<&QuestionCard> {
        match self {
            Card::Question(q) => Some(q),
            _ => None,
        }
    }
}

/// A question awaiting an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCard {
    pub question_type: String,
    pub question_text: String,
    /// Server-assigned identity, sent back when marking
    pub idx: i64,
    /// Text to speak for listening questions
    pub solution: Option<String>,
    pub voice: Option<String>,
}

impl QuestionCard {
    pub fn is_listening(&self) -> bool {
        self.question_type == LISTENING_QUESTION
    }

    /// The audio to request before the question becomes answerable.
    ///
    /// A listening question without a solution has nothing to speak, so it
    /// is answerable immediately.
    pub fn audio_cue(&self) -> Option<AudioCue> {
        if !self.is_listening() {
            return None;
        }
        self.solution.as_ref().map(|content| AudioCue {
            content: content.clone(),
            voice: self.voice.clone(),
        })
    }
}

/// Text to synthesize for a listening question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCue {
    pub content: String,
    pub voice: Option<String>,
}

/// Server-side marking of a submitted answer
#[derive(Debug, Clone, PartialEq)]
pub struct MarkResult {
    pub solution: String,
    /// In `[0, 1]`
    pub score: f64,
    pub analysis: String,
}
