//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! for use in tests. Replies are queued up front and handed out one per call, so a
//! test can script a whole analysis (legal-section extraction, then the summary)
//! without making actual API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use tokio::sync::Mutex;

/// A mock completion model returning queued replies in order.
/// An exhausted queue answers with an empty string.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    preambles: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockCompletionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply
    pub async fn push_text(&self, text: &str) {
        self.replies.lock().await.push_back(Ok(text.to_string()));
    }

    /// Queue a provider failure
    pub async fn push_error(&self, message: &str) {
        self.replies.lock().await.push_back(Err(message.to_string()));
    }

    /// Number of completion calls made so far
    pub async fn calls(&self) -> usize {
        self.preambles.lock().await.len()
    }

    /// Preamble of every call, in order
    pub async fn preambles(&self) -> Vec<Option<String>> {
        self.preambles.lock().await.clone()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.preambles
            .lock()
            .await
            .push(completion_request.preamble.clone());

        let reply = self.replies.lock().await.pop_front();
        match reply {
            Some(Ok(text)) => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text(&text)),
                raw_response: text,
            }),
            Some(Err(message)) => Err(CompletionError::ProviderError(message)),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: String::new(),
            }),
        }
    }
}
