//! Session runtime executor

use super::{Input, RunOutcome, UiEvent};
use crate::api::QuizApi;
use crate::audio::AudioSink;
use crate::guard::{ActivityProbe, LifecycleGuard, UnloadDecision};
use crate::session::{
    interpret, transition, AudioOutcome, AudioRequest, Effect, Event, Lifecycle, Session,
    SessionContext,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// What executing an effect asks of the event loop
enum EffectOutcome {
    Done,
    /// Feed this event back into the machine immediately
    Chain(Event),
    Close,
}

/// Generic session runtime that can work with any backend and audio sink
pub struct SessionRuntime<A, P>
where
    A: QuizApi + 'static,
    P: AudioSink + 'static,
{
    context: SessionContext,
    session: Session,
    api: Arc<A>,
    audio: Arc<P>,
    guard: LifecycleGuard<A>,
    /// Replies from spawned backend calls
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    input_rx: mpsc::Receiver<Input>,
    broadcast_tx: broadcast::Sender<UiEvent>,
    activity_tx: watch::Sender<Lifecycle>,
    /// Cancels outstanding backend calls when the runtime stops
    cancel: CancellationToken,
}

impl<A, P> SessionRuntime<A, P>
where
    A: QuizApi + 'static,
    P: AudioSink + 'static,
{
    pub fn new(
        context: SessionContext,
        api: Arc<A>,
        audio: Arc<P>,
        input_rx: mpsc::Receiver<Input>,
        broadcast_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        let session = Session::new();
        let (event_tx, event_rx) = mpsc::channel(32);
        let (activity_tx, activity_rx) = watch::channel(session.lifecycle);
        let guard = LifecycleGuard::new(ActivityProbe::new(activity_rx), api.clone());

        Self {
            context,
            session,
            api,
            audio,
            guard,
            event_rx,
            event_tx,
            input_rx,
            broadcast_tx,
            activity_tx,
            cancel: CancellationToken::new(),
        }
    }

    pub async fn run(mut self) -> RunOutcome {
        tracing::info!(task = %self.context.task_name, "Starting session runtime");
        self.publish_render();

        // Process events in a loop - no recursion
        let outcome = loop {
            tokio::select! {
                biased;

                Some(event) = self.event_rx.recv() => {
                    if let Some(outcome) = self.process_event(event).await {
                        break outcome;
                    }
                }

                input = self.input_rx.recv() => {
                    if let Some(outcome) = self.handle_input(input).await {
                        break outcome;
                    }
                }
            }
        };

        self.cancel.cancel();
        tracing::info!(index = self.session.index, "Session runtime stopped");
        outcome
    }

    async fn handle_input(&mut self, input: Option<Input>) -> Option<RunOutcome> {
        match input {
            Some(Input::Line(line)) => {
                self.guard.disarm();
                let event = interpret(&self.session, &line);
                self.process_event(event).await
            }
            Some(Input::Interrupt) => match self.guard.on_interrupt() {
                UnloadDecision::Stay { warning } => {
                    self.publish(UiEvent::Notice {
                        message: warning.to_string(),
                    });
                    None
                }
                UnloadDecision::Leave { quit } => Some(RunOutcome::Abandoned { quit }),
            },
            Some(Input::Closed) | None => Some(RunOutcome::Abandoned {
                quit: self.guard.on_close(),
            }),
        }
    }

    /// Run an event through the machine, then any events its effects produce
    async fn process_event(&mut self, event: Event) -> Option<RunOutcome> {
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let from_user = current_event.is_user_action();

            // Pure state transition
            let result = match transition(&self.session, &self.context, current_event) {
                Ok(r) => r,
                Err(e) => {
                    if from_user {
                        // Rejected actions are user-facing (e.g. "please wait")
                        self.publish(UiEvent::Notice {
                            message: e.to_string(),
                        });
                    } else {
                        tracing::warn!(error = %e, "Dropping backend reply");
                    }
                    return None;
                }
            };

            self.session = result.new_session;
            // Published before effects run, so the guard sees an initiated
            // end before the end notification goes out
            self.activity_tx.send_replace(self.session.lifecycle);

            for effect in result.effects {
                match self.execute_effect(effect).await {
                    EffectOutcome::Done => {}
                    EffectOutcome::Chain(event) => events_to_process.push(event),
                    EffectOutcome::Close => return Some(RunOutcome::Completed),
                }
            }
        }

        None
    }

    /// Execute an effect
    async fn execute_effect(&mut self, effect: Effect) -> EffectOutcome {
        match effect {
            Effect::Render => {
                self.publish_render();
                EffectOutcome::Done
            }

            Effect::ShowError { message } => {
                self.publish(UiEvent::Error { message });
                EffectOutcome::Done
            }

            Effect::StartSession { name, task_type } => {
                let api = self.api.clone();
                self.spawn_request(async move {
                    match api.start(&name, task_type.as_deref()).await {
                        Ok(()) => Event::Started,
                        Err(error) => Event::StartFailed { error },
                    }
                });
                EffectOutcome::Done
            }

            Effect::FetchCard { index } => {
                let api = self.api.clone();
                self.spawn_request(async move {
                    match api.fetch_card(index).await {
                        Ok(card) => Event::CardFetched { index, card },
                        Err(error) => Event::FetchFailed { index, error },
                    }
                });
                EffectOutcome::Done
            }

            Effect::PlayAudio { request } => {
                let api = self.api.clone();
                let audio = self.audio.clone();
                self.spawn_request(async move {
                    let outcome = play_cue(api.as_ref(), audio.as_ref(), &request).await;
                    if let AudioOutcome::Degraded { reason } = &outcome {
                        tracing::warn!(reason = %reason, "Listening cue unavailable, continuing without audio");
                    }
                    Event::AudioFinished { outcome }
                });
                EffectOutcome::Done
            }

            Effect::SubmitAnswer { submission } => {
                tracing::info!(question_idx = submission.idx, "Submitting answer");
                let api = self.api.clone();
                self.spawn_request(async move {
                    match api.mark(&submission).await {
                        Ok(result) => Event::AnswerMarked { result },
                        Err(error) => Event::MarkFailed { error },
                    }
                });
                EffectOutcome::Done
            }

            // Awaited in place: the page may not close before the backend
            // has been told. Failures are not the user's concern.
            Effect::NotifyEnd => {
                if let Err(e) = self.api.notify_end().await {
                    tracing::warn!(error = %e, "End notification failed");
                }
                EffectOutcome::Chain(Event::EndNotified)
            }

            Effect::Close => EffectOutcome::Close,
        }
    }

    /// Run a backend call in the background and feed its reply back as an event
    fn spawn_request<F>(&self, call: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::debug!("Backend call cancelled");
                }

                event = call => {
                    let _ = event_tx.send(event).await;
                }
            }
        });
    }

    fn publish_render(&self) {
        self.publish(UiEvent::Render {
            session: self.session.clone(),
        });
    }

    fn publish(&self, event: UiEvent) {
        // No subscribers is fine: the front end may have gone away
        let _ = self.broadcast_tx.send(event);
    }
}

/// Synthesize the cue and play it to completion. Any failure degrades to a
/// silent question.
async fn play_cue<A, P>(api: &A, audio: &P, request: &AudioRequest) -> AudioOutcome
where
    A: QuizApi + ?Sized,
    P: AudioSink + ?Sized,
{
    let blob = match api.synthesize(request).await {
        Ok(blob) => blob,
        Err(e) => {
            return AudioOutcome::Degraded {
                reason: format!("synthesis failed: {e}"),
            }
        }
    };
    match audio.play(&blob).await {
        Ok(()) => AudioOutcome::Played,
        Err(e) => AudioOutcome::Degraded {
            reason: e.to_string(),
        },
    }
}
