//! Model client trait and a scripted mock.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::assistant::types::{CompletionRequest, CompletionResponse};
use crate::error::{QaError, Result};

/// Stateless model client. Each call carries the full conversation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Model identifier used for requests
    fn model(&self) -> &str;
}

#[derive(Debug, Clone)]
enum MockReply {
    Response(CompletionResponse),
    Error(String),
    Delayed(Duration, CompletionResponse),
    Hang,
}

/// Client that replays queued replies in order and records every request.
///
/// An exhausted queue yields an error.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: CompletionResponse) -> Self {
        self.push(MockReply::Response(response))
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Error(message.into()))
    }

    pub fn with_delayed_response(self, delay: Duration, response: CompletionResponse) -> Self {
        self.push(MockReply::Delayed(delay, response))
    }

    /// Reply that never resolves
    pub fn hanging(self) -> Self {
        self.push(MockReply::Hang)
    }

    fn push(self, reply: MockReply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let reply = {
            let mut replies = self
                .replies
                .lock()
                .map_err(|e| QaError::Assistant(e.to_string()))?;
            replies.pop_front()
        };
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(message)) => Err(QaError::Assistant(message)),
            Some(MockReply::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(MockReply::Hang) => std::future::pending().await,
            None => Err(QaError::Assistant("mock client has no more replies".to_string())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
