//! Quiz backend client
//!
//! The session runtime talks to the backend only through [`QuizApi`], so it
//! can be driven by mocks in tests.

mod error;
mod http;
mod types;

pub use error::{ApiError, ApiErrorKind};
pub use http::HttpQuizApi;

use crate::session::{AnswerSubmission, AudioRequest, Card, MarkResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Calls the session runtime makes against the quiz backend
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Start a session for the named task
    async fn start(&self, name: &str, task_type: Option<&str>) -> Result<(), ApiError>;

    /// Fetch the card at `index` (-1 for the intro card)
    async fn fetch_card(&self, index: i64) -> Result<Card, ApiError>;

    /// Synthesize speech, returning a playable audio blob
    async fn synthesize(&self, request: &AudioRequest) -> Result<Vec<u8>, ApiError>;

    /// Submit an answer for marking
    async fn mark(&self, submission: &AnswerSubmission) -> Result<MarkResult, ApiError>;

    /// Report that the session completed
    async fn notify_end(&self) -> Result<(), ApiError>;

    /// Report that the session was abandoned
    async fn notify_quit(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: QuizApi + ?Sized> QuizApi for Arc<T> {
    async fn start(&self, name: &str, task_type: Option<&str>) -> Result<(), ApiError> {
        (**self).start(name, task_type).await
    }

    async fn fetch_card(&self, index: i64) -> Result<Card, ApiError> {
        (**self).fetch_card(index).await
    }

    async fn synthesize(&self, request: &AudioRequest) -> Result<Vec<u8>, ApiError> {
        (**self).synthesize(request).await
    }

    async fn mark(&self, submission: &AnswerSubmission) -> Result<MarkResult, ApiError> {
        (**self).mark(submission).await
    }

    async fn notify_end(&self) -> Result<(), ApiError> {
        (**self).notify_end().await
    }

    async fn notify_quit(&self) -> Result<(), ApiError> {
        (**self).notify_quit().await
    }
}

/// Logging wrapper for quiz backends
pub struct LoggingQuizApi<A> {
    inner: A,
}

impl<A: QuizApi> LoggingQuizApi<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(call: &'static str, started: std::time::Instant, result: &Result<T, ApiError>) {
    let duration = started.elapsed();
    match result {
        Ok(_) => {
            tracing::info!(call, duration_ms = %duration.as_millis(), "Quiz request completed");
        }
        Err(e) => {
            tracing::error!(
                call,
                duration_ms = %duration.as_millis(),
                error = %e.message,
                kind = ?e.kind,
                "Quiz request failed"
            );
        }
    }
}

#[async_trait]
impl<A: QuizApi> QuizApi for LoggingQuizApi<A> {
    async fn start(&self, name: &str, task_type: Option<&str>) -> Result<(), ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.start(name, task_type).await;
        log_outcome("start", started, &result);
        result
    }

    async fn fetch_card(&self, index: i64) -> Result<Card, ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.fetch_card(index).await;
        if let Ok(card) = &result {
            tracing::debug!(index, card = card.kind(), "Fetched card");
        }
        log_outcome("fetch_card", started, &result);
        result
    }

    async fn synthesize(&self, request: &AudioRequest) -> Result<Vec<u8>, ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.synthesize(request).await;
        if let Ok(audio) = &result {
            tracing::debug!(bytes = audio.len(), voice = ?request.voice, "Synthesized audio");
        }
        log_outcome("synthesize", started, &result);
        result
    }

    async fn mark(&self, submission: &AnswerSubmission) -> Result<MarkResult, ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.mark(submission).await;
        log_outcome("mark", started, &result);
        result
    }

    async fn notify_end(&self) -> Result<(), ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.notify_end().await;
        log_outcome("notify_end", started, &result);
        result
    }

    async fn notify_quit(&self) -> Result<(), ApiError> {
        let started = std::time::Instant::now();
        let result = self.inner.notify_quit().await;
        log_outcome("notify_quit", started, &result);
        result
    }
}
