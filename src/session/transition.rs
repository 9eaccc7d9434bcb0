//! Pure state transition function
//!
//! Every user action and every backend reply passes through [`transition`],
//! which returns the next session and the effects the runtime must perform.
//! Nothing here touches the network or the terminal.

use super::card::{Card, QuestionCard};
use super::effect::{AnswerSubmission, AudioRequest};
use super::state::{Lifecycle, Pending};
use super::{Effect, Event, Session, SessionContext, SessionState};
use thiserror::Error;

/// Index used to request the introductory card before a session exists
pub const PREVIEW_INDEX: i64 = -1;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            new_session: session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Please wait for the current request to finish")]
    Busy,
    #[error("The session has finished")]
    Finished,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    session: &Session,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if session.lifecycle == Lifecycle::Finished {
        return Err(TransitionError::Finished);
    }
    if event.is_user_action() && session.is_busy() {
        return Err(TransitionError::Busy);
    }

    let reports_failure = matches!(
        event,
        Event::StartFailed { .. } | Event::FetchFailed { .. } | Event::MarkFailed { .. }
    );
    let mut result = dispatch(session, context, event)?;
    // A failure stays retryable only until the next accepted event
    if !reports_failure {
        result.new_session.last_failed = None;
    }
    Ok(result)
}

#[allow(clippy::too_many_lines)] // One arm per row of the transition table
fn dispatch(
    session: &Session,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&session.state, event) {
        // ============================================================
        // Before the session starts
        // ============================================================
        (SessionState::NotStarted | SessionState::Previewing { .. }, Event::Preview) => {
            Ok(request_fetch(session, PREVIEW_INDEX))
        }

        (SessionState::NotStarted | SessionState::Previewing { .. }, Event::Start) => {
            Ok(on_start(session, context))
        }

        (_, Event::Started) if session.pending == Some(Pending::Start) => {
            let mut next = session.clone();
            next.index = 0;
            next.lifecycle = Lifecycle::Active;
            next.state = SessionState::AwaitingConfirmation { card: None };
            next.pending = Some(Pending::Fetch { index: 0 });
            Ok(TransitionResult::new(next)
                .with_effect(Effect::Render)
                .with_effect(Effect::fetch_card(0)))
        }

        (_, Event::StartFailed { error }) if session.pending == Some(Pending::Start) => {
            Ok(settle_with_error(
                session,
                format!("Could not start the session: {error}"),
            ))
        }

        // ============================================================
        // Confirming and advancing
        // ============================================================

        // A failed fetch left no card: re-issue it for the same index
        (SessionState::AwaitingConfirmation { card: None }, Event::Next) => {
            Ok(request_fetch(session, session.index))
        }

        (SessionState::AwaitingConfirmation { card: Some(Card::Question(_)) }, Event::Next) => {
            Err(TransitionError::InvalidTransition(
                "the question is waiting for an answer".to_string(),
            ))
        }

        // Non-question cards skip marking and advance directly
        (SessionState::AwaitingConfirmation { card: Some(_) }, Event::Next)
        | (SessionState::ReadyForNext { .. }, Event::Next) => Ok(on_advance(session)),

        (SessionState::AwaitingConfirmation { card: Some(Card::Question(question)) }, Event::Submit { answer }) => {
            Ok(on_submit(session, question, answer.trim().to_string()))
        }

        (SessionState::AwaitingConfirmation { card: Some(_) } | SessionState::ReadyForNext { .. }, Event::Refresh) => {
            Ok(request_fetch(session, session.index))
        }

        (_, Event::Retry) => on_retry(session, context),

        // ============================================================
        // Card fetch results
        // ============================================================
        (_, Event::CardFetched { index, card })
            if session.pending == Some(Pending::Fetch { index }) =>
        {
            Ok(on_card(session, context, index, card))
        }

        (_, Event::FetchFailed { index, error })
            if session.pending == Some(Pending::Fetch { index }) =>
        {
            Ok(settle_with_error(
                session,
                format!("Could not load card {index}: {error}"),
            ))
        }

        // ============================================================
        // Audio and marking
        // ============================================================
        (_, Event::AudioFinished { .. }) if session.pending == Some(Pending::Audio) => {
            let mut next = session.clone();
            next.pending = None;
            Ok(TransitionResult::new(next).with_effect(Effect::Render))
        }

        (SessionState::AwaitingConfirmation { card: Some(card) }, Event::AnswerMarked { result })
            if matches!(session.pending, Some(Pending::Mark { .. })) =>
        {
            let mut next = session.clone();
            next.pending = None;
            next.state = SessionState::ReadyForNext {
                card: card.clone(),
                mark: Some(result),
            };
            Ok(TransitionResult::new(next).with_effect(Effect::Render))
        }

        // Draft stays so the user can retry without retyping
        (_, Event::MarkFailed { error }) if matches!(session.pending, Some(Pending::Mark { .. })) => {
            Ok(settle_with_error(
                session,
                format!("Could not mark the answer: {error}"),
            ))
        }

        // ============================================================
        // Completion
        // ============================================================
        (SessionState::Ended, Event::Dismiss) if session.is_active() => {
            let mut next = session.clone();
            next.lifecycle = Lifecycle::EndInitiated;
            next.pending = Some(Pending::End);
            Ok(TransitionResult::new(next)
                .with_effect(Effect::Render)
                .with_effect(Effect::NotifyEnd))
        }

        (SessionState::Ended, Event::Dismiss) => {
            Ok(TransitionResult::new(session.clone()).with_effect(Effect::Close))
        }

        (_, Event::EndNotified) if session.pending == Some(Pending::End) => {
            let mut next = session.clone();
            next.lifecycle = Lifecycle::Finished;
            next.pending = None;
            Ok(TransitionResult::new(next).with_effect(Effect::Close))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "no transition from {} with event {:?}",
            state.name(),
            event
        ))),
    }
}

/// Issue the start request
fn on_start(session: &Session, context: &SessionContext) -> TransitionResult {
    let mut next = session.clone();
    next.pending = Some(Pending::Start);
    TransitionResult::new(next)
        .with_effect(Effect::Render)
        .with_effect(Effect::StartSession {
            name: context.task_name.clone(),
            task_type: context.task_type.clone(),
        })
}

/// Request the card after the current one. The index moves only once
/// the card arrives.
fn on_advance(session: &Session) -> TransitionResult {
    request_fetch(session, session.index + 1)
}

/// Submit `answer` for the displayed question, bound to its own `idx`
fn on_submit(session: &Session, question: &QuestionCard, answer: String) -> TransitionResult {
    let mut next = session.clone();
    next.draft.clone_from(&answer);
    next.pending = Some(Pending::Mark {
        question_idx: question.idx,
    });
    TransitionResult::new(next)
        .with_effect(Effect::Render)
        .with_effect(Effect::SubmitAnswer {
            submission: AnswerSubmission {
                q_type: question.question_type.clone(),
                idx: question.idx,
                answer,
            },
        })
}

fn request_fetch(session: &Session, index: i64) -> TransitionResult {
    let mut next = session.clone();
    next.pending = Some(Pending::Fetch { index });
    TransitionResult::new(next)
        .with_effect(Effect::Render)
        .with_effect(Effect::fetch_card(index))
}

/// Re-issue exactly the call whose failure is on screen
fn on_retry(session: &Session, context: &SessionContext) -> Result<TransitionResult, TransitionError> {
    match (&session.last_failed, session.state.open_question()) {
        (Some(Pending::Start), _) if session.state.is_not_started() => Ok(on_start(session, context)),
        (Some(Pending::Fetch { index }), _) => Ok(request_fetch(session, *index)),
        (Some(Pending::Mark { .. }), Some(question)) => {
            Ok(on_submit(session, question, session.draft.clone()))
        }
        _ => Err(TransitionError::InvalidTransition(
            "there is no failed request to retry".to_string(),
        )),
    }
}

/// Clear the outstanding call and report why it failed
fn settle_with_error(session: &Session, message: String) -> TransitionResult {
    let mut next = session.clone();
    next.last_failed = next.pending.take();
    TransitionResult::new(next).with_effects([Effect::show_error(message), Effect::Render])
}

fn on_card(session: &Session, context: &SessionContext, index: i64, card: Card) -> TransitionResult {
    let mut next = session.clone();
    next.pending = None;

    // An end card finishes the session whatever was on screen
    if card == Card::End {
        if index >= 0 {
            next.index = index;
        }
        next.state = SessionState::Ended;
        return TransitionResult::new(next).with_effect(Effect::Render);
    }

    if index == PREVIEW_INDEX && session.state.is_not_started() {
        next.state = SessionState::Previewing { card };
        return TransitionResult::new(next).with_effect(Effect::Render);
    }

    if index == session.index {
        // Refresh of a marked card keeps its result and does not replay audio
        if let SessionState::ReadyForNext { mark, .. } = &session.state {
            next.state = SessionState::ReadyForNext {
                card,
                mark: mark.clone(),
            };
            return TransitionResult::new(next).with_effect(Effect::Render);
        }
    } else {
        next.index = index;
        next.draft.clear();
    }

    let audio = card
        .as_question()
        .and_then(QuestionCard::audio_cue)
        .map(|cue| AudioRequest::from_cue(cue, context.audio_mode));
    next.state = SessionState::AwaitingConfirmation { card: Some(card) };

    match audio {
        Some(request) => {
            next.pending = Some(Pending::Audio);
            TransitionResult::new(next)
                .with_effect(Effect::Render)
                .with_effect(Effect::PlayAudio { request })
        }
        None => TransitionResult::new(next).with_effect(Effect::Render),
    }
}
