//! reqwest implementation of the quiz backend

use super::types::{CardRequest, ErrorBody, MarkResponse, StartRequest, WireCard};
use super::{ApiError, QuizApi};
use crate::session::{AnswerSubmission, AudioRequest, Card, MarkResult};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;

const START_ROUTE: &str = "chat/quiz/start";
const CARD_ROUTE: &str = "chat/quiz/card";
const PLAY_ROUTE: &str = "chat/quiz/play";
const MARK_ROUTE: &str = "chat/quiz/mark";
const QUIT_ROUTE: &str = "chat/quiz/quit";
const END_ROUTE: &str = "chat/quiz/end";

/// Quiz backend reached over HTTP
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    base_url: String,
}

impl HttpQuizApi {
    /// Quiz calls carry no timeout; a hanging call leaves the session waiting
    /// until the user gives up.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{route}", self.base_url)
    }

    async fn post_json<B: Serialize + Sync>(&self, route: &str, body: &B) -> Result<Response, ApiError> {
        let response = self.client.post(self.url(route)).json(body).send().await?;
        check_status(response).await
    }

    async fn post_empty(&self, route: &str) -> Result<Response, ApiError> {
        let response = self.client.post(self.url(route)).send().await?;
        check_status(response).await
    }
}

/// Turn a non-success response into a server error
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::transport(format!("Failed to read response: {e}")))?;
    Err(classify_error(status, &body))
}

fn classify_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError::server(parsed.message()),
        Err(_) if body.trim().is_empty() => ApiError::server(format!("HTTP {status}")),
        Err(_) => ApiError::server(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn start(&self, name: &str, task_type: Option<&str>) -> Result<(), ApiError> {
        self.post_json(START_ROUTE, &StartRequest { name, task_type })
            .await?;
        Ok(())
    }

    async fn fetch_card(&self, index: i64) -> Result<Card, ApiError> {
        let response = self.post_json(CARD_ROUTE, &CardRequest { idx: index }).await?;
        let wire: WireCard = response.json().await?;
        wire.into_card().map_err(ApiError::decode)
    }

    async fn synthesize(&self, request: &AudioRequest) -> Result<Vec<u8>, ApiError> {
        let response = self.post_json(PLAY_ROUTE, request).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn mark(&self, submission: &AnswerSubmission) -> Result<MarkResult, ApiError> {
        let response = self.post_json(MARK_ROUTE, submission).await?;
        let mark: MarkResponse = response.json().await?;
        Ok(mark.into())
    }

    async fn notify_end(&self) -> Result<(), ApiError> {
        self.post_empty(END_ROUTE).await?;
        Ok(())
    }

    async fn notify_quit(&self) -> Result<(), ApiError> {
        self.post_empty(QUIT_ROUTE).await?;
        Ok(())
    }
}
