//! Line-oriented terminal front end
//!
//! Typed lines and Ctrl-C become [`Input`]s for the runtime. [`UiEvent`]s
//! from the runtime are turned into printed lines by [`View`], which only
//! prints what changed since the last render.

use crate::runtime::{Input, UiEvent};
use crate::session::{Card, Lifecycle, MarkResult, Pending, Session, SessionState};
use std::io::BufRead;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Read stdin on a dedicated thread. A pending blocking read must not hold
/// up runtime shutdown, so this is a detached OS thread rather than tokio
/// stdin.
pub fn spawn_line_reader(tx: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let input = match line {
                Ok(line) => Input::Line(line),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read from stdin");
                    break;
                }
            };
            if tx.blocking_send(input).is_err() {
                return;
            }
        }
        let _ = tx.blocking_send(Input::Closed);
    });
}

/// Forward Ctrl-C as [`Input::Interrupt`] until the runtime goes away
pub fn spawn_interrupt_listener(tx: mpsc::Sender<Input>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
                return;
            }
            if tx.send(Input::Interrupt).await.is_err() {
                return;
            }
        }
    })
}

/// Print UI events until the runtime drops its sender
pub fn spawn_renderer(mut rx: broadcast::Receiver<UiEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut view = View::default();
        loop {
            match rx.recv().await {
                Ok(event) => {
                    for line in view.apply(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Incremental renderer for session updates
#[derive(Debug, Default)]
pub struct View {
    last: Option<Session>,
}

impl View {
    pub fn apply(&mut self, event: &UiEvent) -> Vec<String> {
        match event {
            UiEvent::Render { session } => self.render(session),
            UiEvent::Error { message } => vec![format!("⚠️  {message}")],
            UiEvent::Notice { message } => vec![message.clone()],
        }
    }

    fn render(&mut self, session: &Session) -> Vec<String> {
        let prev = self.last.replace(session.clone());
        let mut lines = Vec::new();

        let state_changed = prev
            .as_ref()
            .is_none_or(|p| p.index != session.index || p.state.card() != session.state.card());
        if state_changed {
            match &session.state {
                SessionState::NotStarted if prev.is_none() => {
                    lines.push("Welcome. Type /preview to see the introduction.".to_string());
                }
                SessionState::Ended => lines.push("🎉 Session complete.".to_string()),
                state => {
                    if let Some(card) = state.card() {
                        lines.push(String::new());
                        lines.extend(card_lines(card));
                    }
                }
            }
        }

        if let Some(mark) = session.state.mark() {
            if prev.as_ref().and_then(|p| p.state.mark()) != Some(mark) {
                lines.extend(mark_lines(mark, &session.draft));
            }
        }

        let pending_changed = prev.as_ref().map(|p| &p.pending) != Some(&session.pending);
        if pending_changed {
            match session.pending {
                Some(Pending::Audio) => lines.push("🔊 Listen...".to_string()),
                Some(Pending::Mark { .. }) => lines.push("Marking...".to_string()),
                _ => {}
            }
        }

        let was_enabled = prev.as_ref().is_some_and(Session::controls_enabled);
        if session.controls_enabled()
            && session.lifecycle != Lifecycle::EndInitiated
            && (!was_enabled || !lines.is_empty())
        {
            lines.push(prompt(session));
        }

        lines
    }
}

fn card_lines(card: &Card) -> Vec<String> {
    match card {
        Card::Intro { content } => vec![content.clone()],
        Card::Learn {
            summary,
            content,
            images,
        } => {
            let mut lines = vec![format!("== {summary} =="), content.clone()];
            lines.extend(images.iter().map(|image| format!("[image] {image}")));
            lines
        }
        Card::Question(question) => vec![
            format!("[{}]", question.question_type),
            question.question_text.clone(),
        ],
        Card::End => vec![],
    }
}

fn mark_lines(mark: &MarkResult, answer: &str) -> Vec<String> {
    let mut lines = vec![
        format!("Right answer: {}", mark.solution),
        format!("Your answer: {answer}"),
        format!("Score: {}", mark.score),
    ];
    if !mark.analysis.is_empty() {
        lines.push(mark.analysis.clone());
    }
    lines
}

fn prompt(session: &Session) -> String {
    let label = session.primary_label();
    if session.state.open_question().is_some() {
        format!("Type your answer and press Enter to {label}")
    } else {
        format!("Press Enter: {label}")
    }
}
