//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::card::LISTENING_QUESTION;
use super::state::*;
use super::transition::*;
use super::*;
use crate::api::ApiError;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("vocab-quiz")
}

/// One step of a simulated run: either the user acts, or the backend
/// answers whatever call is outstanding.
#[derive(Debug, Clone)]
enum Step {
    User(Event),
    Reply { success: bool, card: Card },
}

/// Build the backend event answering `pending`
fn reply_for(pending: &Pending, success: bool, card: Card) -> Event {
    match (pending, success) {
        (Pending::Start, true) => Event::Started,
        (Pending::Start, false) => Event::StartFailed {
            error: ApiError::server("start refused"),
        },
        (Pending::Fetch { index }, true) => Event::CardFetched {
            index: *index,
            card,
        },
        (Pending::Fetch { index }, false) => Event::FetchFailed {
            index: *index,
            error: ApiError::server("not found"),
        },
        (Pending::Audio, true) => Event::AudioFinished {
            outcome: AudioOutcome::Played,
        },
        (Pending::Audio, false) => Event::AudioFinished {
            outcome: AudioOutcome::Degraded {
                reason: "unsupported voice".to_string(),
            },
        },
        (Pending::Mark { .. }, true) => Event::AnswerMarked {
            result: MarkResult {
                solution: "apple".to_string(),
                score: 1.0,
                analysis: "correct".to_string(),
            },
        },
        (Pending::Mark { .. }, false) => Event::MarkFailed {
            error: ApiError::transport("connection reset"),
        },
        (Pending::End, _) => Event::EndNotified,
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_question() -> impl Strategy<Value = QuestionCard> {
    (
        prop_oneof![
            Just(LISTENING_QUESTION.to_string()),
            Just("GapFillingQuestion".to_string()),
        ],
        "[a-z ]{1,20}",
        0i64..50,
        proptest::option::of("[a-z]{1,10}"),
        proptest::option::of(Just("en-US".to_string())),
    )
        .prop_map(|(question_type, question_text, idx, solution, voice)| QuestionCard {
            question_type,
            question_text,
            idx,
            solution,
            voice,
        })
}

fn arb_content_card() -> impl Strategy<Value = Card> {
    prop_oneof![
        "[a-zA-Z ]{1,30}".prop_map(|content| Card::Intro { content }),
        ("[a-zA-Z ]{1,20}", "[a-zA-Z ]{1,30}").prop_map(|(summary, content)| Card::Learn {
            summary,
            content,
            images: vec![],
        }),
        arb_question().prop_map(Card::Question),
    ]
}

fn arb_card() -> impl Strategy<Value = Card> {
    prop_oneof![
        9 => arb_content_card(),
        1 => Just(Card::End),
    ]
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Preview),
        Just(Event::Start),
        Just(Event::Next),
        "[a-z ]{0,10}".prop_map(|answer| Event::Submit { answer }),
        Just(Event::Retry),
        Just(Event::Refresh),
        Just(Event::Dismiss),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        arb_user_event().prop_map(Step::User),
        (any::<bool>(), arb_card()).prop_map(|(success, card)| Step::Reply { success, card }),
    ]
}

fn arb_displayed_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::NotStarted),
        Just(SessionState::AwaitingConfirmation { card: None }),
        arb_content_card().prop_map(|card| SessionState::AwaitingConfirmation { card: Some(card) }),
        arb_content_card().prop_map(|card| SessionState::ReadyForNext { card, mark: None }),
    ]
}

/// Run `steps` from a fresh session, returning every accepted transition
fn run_steps(steps: Vec<Step>) -> Vec<(Session, Event, TransitionResult)> {
    let ctx = test_context();
    let mut session = Session::new();
    let mut history = Vec::new();

    for step in steps {
        let event = match step {
            Step::User(event) => event,
            Step::Reply { success, card } => match &session.pending {
                Some(pending) => reply_for(pending, success, card),
                None => continue,
            },
        };
        if let Ok(result) = transition(&session, &ctx, event.clone()) {
            let next = result.new_session.clone();
            history.push((session, event, result));
            session = next;
        }
    }
    history
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: index is non-decreasing and moves at most one card at a time
    #[test]
    fn prop_index_advances_by_one(steps in proptest::collection::vec(arb_step(), 0..60)) {
        for (before, _, result) in run_steps(steps) {
            let delta = result.new_session.index - before.index;
            prop_assert!(delta == 0 || delta == 1, "index jumped from {} to {}", before.index, result.new_session.index);
        }
    }

    // Invariant 2: leaving ReadyForNext for a new card bumps the index by exactly one
    #[test]
    fn prop_ready_for_next_advance_increments(steps in proptest::collection::vec(arb_step(), 0..60)) {
        for (before, _, result) in run_steps(steps) {
            let after = &result.new_session;
            if matches!(before.state, SessionState::ReadyForNext { .. })
                && matches!(after.state, SessionState::AwaitingConfirmation { .. })
            {
                prop_assert_eq!(after.index, before.index + 1);
                prop_assert!(after.draft.is_empty());
            }
        }
    }

    // Invariant 3: fetch failures never change state or index
    #[test]
    fn prop_fetch_failure_changes_nothing(steps in proptest::collection::vec(arb_step(), 0..60)) {
        for (before, event, result) in run_steps(steps) {
            if let Event::FetchFailed { .. } = event {
                prop_assert_eq!(&result.new_session.state, &before.state);
                prop_assert_eq!(result.new_session.index, before.index);
                prop_assert_eq!(result.new_session.lifecycle, before.lifecycle);
            }
        }
    }

    // Invariant 4: an end card forces Ended from any state
    #[test]
    fn prop_end_card_forces_ended(state in arb_displayed_state(), index in 0i64..20) {
        let session = Session {
            index,
            state,
            lifecycle: Lifecycle::Active,
            pending: Some(Pending::Fetch { index: index + 1 }),
            draft: String::new(),
            last_failed: None,
        };
        let result = transition(&session, &test_context(), Event::CardFetched {
            index: index + 1,
            card: Card::End,
        });
        prop_assert!(result.is_ok(), "End card rejected: {:?}", result);
        prop_assert_eq!(result.unwrap().new_session.state, SessionState::Ended);
    }

    // Invariant 5: submissions carry the displayed card's idx, not the session index
    #[test]
    fn prop_submit_uses_card_idx(question in arb_question(), index in 0i64..20, answer in "[a-z ]{0,10}") {
        let card_idx = question.idx;
        let session = Session {
            index,
            state: SessionState::AwaitingConfirmation { card: Some(Card::Question(question)) },
            lifecycle: Lifecycle::Active,
            pending: None,
            draft: String::new(),
            last_failed: None,
        };
        let result = transition(&session, &test_context(), Event::Submit { answer }).unwrap();
        let submitted: Vec<i64> = result.effects.iter().filter_map(|e| match e {
            Effect::SubmitAnswer { submission } => Some(submission.idx),
            _ => None,
        }).collect();
        prop_assert_eq!(submitted, vec![card_idx]);
    }

    // Invariant 6: user actions are rejected while a call is outstanding
    #[test]
    fn prop_busy_rejects_user_actions(steps in proptest::collection::vec(arb_step(), 0..40), event in arb_user_event()) {
        let Some((_, _, last)) = run_steps(steps).pop() else { return Ok(()); };
        let session = last.new_session;
        if session.is_busy() {
            let result = transition(&session, &test_context(), event);
            prop_assert!(result.is_err(), "busy session accepted a user action: {:?}", result);
        }
    }

    // Invariant 7: every fetch effect matches the pending call
    #[test]
    fn prop_fetch_effects_match_pending(steps in proptest::collection::vec(arb_step(), 0..60)) {
        for (_, _, result) in run_steps(steps) {
            for effect in &result.effects {
                if let Effect::FetchCard { index } = effect {
                    prop_assert_eq!(&result.new_session.pending, &Some(Pending::Fetch { index: *index }));
                }
            }
        }
    }

    // Invariant 8: active only between a successful start and the end notification
    #[test]
    fn prop_active_window(steps in proptest::collection::vec(arb_step(), 0..60)) {
        let mut started = false;
        let mut ended = false;
        for (_, event, result) in run_steps(steps) {
            match event {
                Event::Started => started = true,
                Event::Dismiss if result.effects.contains(&Effect::NotifyEnd) => ended = true,
                _ => {}
            }
            prop_assert_eq!(result.new_session.is_active(), started && !ended);
        }
    }

    // Invariant 10: answers reach the marker only when typed, or when a
    // retry directly follows a marking failure
    #[test]
    fn prop_submissions_come_from_answers(steps in proptest::collection::vec(arb_step(), 0..60)) {
        let mut previous: Option<Event> = None;
        for (_, event, result) in run_steps(steps) {
            if result.effects.iter().any(|e| matches!(e, Effect::SubmitAnswer { .. })) {
                let typed = matches!(event, Event::Submit { .. });
                let retried = matches!(event, Event::Retry)
                    && matches!(previous, Some(Event::MarkFailed { .. }));
                prop_assert!(typed || retried, "{:?} after {:?} submitted an answer", event, previous);
            }
            previous = Some(event);
        }
    }

    // Invariant 9: audio always completes before an answer can be submitted
    #[test]
    fn prop_no_submit_while_audio_plays(steps in proptest::collection::vec(arb_step(), 0..60)) {
        for (before, _, result) in run_steps(steps) {
            let submits = result.effects.iter().any(|e| matches!(e, Effect::SubmitAnswer { .. }));
            if submits {
                prop_assert_ne!(before.pending, Some(Pending::Audio));
            }
        }
    }
}
