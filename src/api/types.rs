//! Wire types for the quiz backend

use crate::session::{Card, MarkResult, QuestionCard};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the start request
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<&'a str>,
}

/// Body of the card request
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CardRequest {
    pub idx: i64,
}

/// Error body returned with non-success responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Value,
}

impl ErrorBody {
    /// The error text, whether the backend sent a string or a structure
    pub fn message(&self) -> String {
        match &self.error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Card as sent by the backend: a type tag plus tag-specific props
#[derive(Debug, Deserialize)]
pub struct WireCard {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: Value,
}

#[derive(Debug, Deserialize)]
struct IntroProps {
    content: String,
}

#[derive(Debug, Deserialize)]
struct LearnProps {
    #[serde(rename = "abstract")]
    summary: String,
    content: String,
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionProps {
    #[serde(rename = "type")]
    question_type: String,
    question: String,
    idx: i64,
    #[serde(default)]
    solution: Option<String>,
    #[serde(default)]
    voice: Option<String>,
}

impl WireCard {
    /// Convert to a typed card, rejecting unknown tags and malformed props
    pub fn into_card(self) -> Result<Card, String> {
        match self.kind.as_str() {
            "intro" => {
                let props: IntroProps = serde_json::from_value(self.props)
                    .map_err(|e| format!("invalid intro card: {e}"))?;
                Ok(Card::Intro {
                    content: props.content,
                })
            }
            "learn" => {
                let props: LearnProps = serde_json::from_value(self.props)
                    .map_err(|e| format!("invalid learn card: {e}"))?;
                Ok(Card::Learn {
                    summary: props.summary,
                    content: props.content,
                    images: props.images,
                })
            }
            "question" => {
                let props: QuestionProps = serde_json::from_value(self.props)
                    .map_err(|e| format!("invalid question card: {e}"))?;
                Ok(Card::Question(QuestionCard {
                    question_type: props.question_type,
                    question_text: props.question,
                    idx: props.idx,
                    solution: props.solution,
                    voice: props.voice,
                }))
            }
            "end" => Ok(Card::End),
            other => Err(format!("unknown card type: {other}")),
        }
    }
}

/// Marking response
#[derive(Debug, Deserialize)]
pub struct MarkResponse {
    pub solution: String,
    pub score: f64,
    #[serde(default)]
    pub analysis: String,
}

impl From<MarkResponse> for MarkResult {
    fn from(resp: MarkResponse) -> Self {
        MarkResult {
            solution: resp.solution,
            score: resp.score.clamp(0.0, 1.0),
            analysis: resp.analysis,
        }
    }
}
