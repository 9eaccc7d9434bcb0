//! Lingo Quiz - terminal client for language-learning quiz sessions
//!
//! Drives a quiz session against the quiz backend: fetches cards, plays
//! listening cues, submits answers for marking, and reports when the session
//! ends or is abandoned.

mod api;
mod audio;
mod config;
mod guard;
mod runtime;
mod session;
mod terminal;

use api::{HttpQuizApi, LoggingQuizApi};
use audio::{AudioSink, CommandSink, SilentSink};
use config::QuizConfig;
use runtime::{RunOutcome, SessionRuntime};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging. Stdout belongs to the session.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lingo_quiz=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = QuizConfig::from_env(std::env::args().nth(1))?;
    tracing::info!(
        server = %config.server_url,
        task = %config.task_name,
        task_type = ?config.task_type,
        "Starting quiz client"
    );

    let api = Arc::new(LoggingQuizApi::new(HttpQuizApi::new(&config.server_url)?));

    let outcome = match config
        .audio_player
        .as_deref()
        .and_then(CommandSink::from_command_line)
    {
        Some(player) => run_session(&config, api, Arc::new(player)).await,
        None => {
            tracing::info!("No audio player configured, listening cues will be silent");
            run_session(&config, api, Arc::new(SilentSink)).await
        }
    };

    match outcome {
        RunOutcome::Completed => tracing::info!("Session completed"),
        RunOutcome::Abandoned { quit: None } => tracing::info!("Exited"),
        RunOutcome::Abandoned { quit: Some(handle) } => {
            // Give the quit notification a bounded chance to get out
            if tokio::time::timeout(config.quit_grace, handle).await.is_err() {
                tracing::debug!(
                    grace_ms = %config.quit_grace.as_millis(),
                    "Quit notification still in flight at exit"
                );
            }
        }
    }

    Ok(())
}

async fn run_session<P: AudioSink + 'static>(
    config: &QuizConfig,
    api: Arc<LoggingQuizApi<HttpQuizApi>>,
    audio: Arc<P>,
) -> RunOutcome {
    let (input_tx, input_rx) = mpsc::channel(32);
    let (broadcast_tx, broadcast_rx) = broadcast::channel(128);

    terminal::spawn_line_reader(input_tx.clone());
    let interrupts = terminal::spawn_interrupt_listener(input_tx);
    let renderer = terminal::spawn_renderer(broadcast_rx);

    let runtime = SessionRuntime::new(
        config.session_context(),
        api,
        audio,
        input_rx,
        broadcast_tx,
    );
    let outcome = runtime.run().await;

    // The runtime dropped its sender; let the renderer drain
    interrupts.abort();
    let _ = renderer.await;
    outcome
}
