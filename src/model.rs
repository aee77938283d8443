//! # LLM Client Module
//!
//! This module connects the analyzer to a hosted language model. The rest of the crate
//! only sees the `LanguageModel` trait: a preamble and a prompt go in, text comes out.
//!
//! ## Key Components
//!
//! - `LanguageModel`: the text-in/text-out contract, implemented for every `rig`
//!   completion model
//! - `RateLimitedCompletionModel`: a wrapper that adds rate limiting to any completion model
//! - `openai_from_env`: builds the rate-limited OpenAI model from `OPENAI_API_KEY`
//!
//! A missing API key is not an error here; callers get `None` and run in demo mode.

use std::future::Future;
use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use rig::agent::AgentBuilder;
use rig::completion::{CompletionModel, Prompt};
use rig::providers::openai;
use thiserror::Error;
use tracing::{debug, warn};

pub mod ratelimited_completion;

#[cfg(test)]
pub(crate) mod mock_model;

pub use ratelimited_completion::RateLimitedCompletionModel;

use crate::config::AnalyzerConfig;

/// Environment variable holding the OpenAI API key
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// The rate-limited OpenAI model used in production
pub type OpenAiModel = RateLimitedCompletionModel<openai::CompletionModel>;

/// Error type for language model calls
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider rejected or failed the request
    #[error("Completion failed: {0}")]
    Completion(String),

    /// The provider answered with something other than text
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// A hosted language model with a plain text contract
pub trait LanguageModel: Clone + Send + Sync {
    /// Send `prompt`, optionally behind a system `preamble`, and return the reply text
    fn generate(
        &self,
        preamble: Option<&str>,
        prompt: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

impl<M> LanguageModel for M
where
    M: CompletionModel,
{
    async fn generate(&self, preamble: Option<&str>, prompt: &str) -> Result<String, LlmError> {
        let mut builder = AgentBuilder::new(self.clone());
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        let agent = builder.build();

        debug!("Prompting model with {} characters", prompt.len());
        agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::Completion(e.to_string()))
    }
}

/// Build the OpenAI model from the environment, or `None` when no key is set
pub fn openai_from_env(config: &AnalyzerConfig) -> Option<OpenAiModel> {
    match std::env::var(API_KEY_VAR) {
        Ok(api_key) if !api_key.trim().is_empty() => Some(new_openai(&api_key, config)),
        _ => {
            warn!("{} is not set in environment variables", API_KEY_VAR);
            None
        }
    }
}

/// Build a rate-limited OpenAI completion model
pub fn new_openai(api_key: &str, config: &AnalyzerConfig) -> OpenAiModel {
    let client = openai::Client::new(api_key);
    let quota = NonZeroU32::new(config.llm_requests_per_minute).unwrap_or(NonZeroU32::MIN);
    RateLimitedCompletionModel::new(
        client.completion_model(&config.model),
        RateLimiter::direct(Quota::per_minute(quota)),
    )
}

#[cfg(test)]
mod tests {
    use super::mock_model::MockCompletionModel;
    use super::*;

    #[tokio::test]
    async fn test_completion_model_generates_text() {
        let model = MockCompletionModel::new();
        model.push_text("Plain summary").await;

        let reply = model.generate(Some("Be brief."), "Summarize").await.unwrap();
        assert_eq!(reply, "Plain summary");
        assert_eq!(model.preambles().await, vec![Some("Be brief.".to_string())]);
    }

    #[tokio::test]
    async fn test_completion_errors_become_llm_errors() {
        let model = MockCompletionModel::new();
        model.push_error("quota exceeded").await;

        let result = model.generate(None, "Summarize").await;
        match result {
            Err(LlmError::Completion(message)) => assert!(message.contains("quota exceeded")),
            other => panic!("expected completion error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_model_passes_through() {
        let inner = MockCompletionModel::new();
        inner.push_text("limited").await;
        let model = RateLimitedCompletionModel::new(
            inner.clone(),
            RateLimiter::direct(Quota::per_minute(NonZeroU32::new(10).unwrap())),
        );

        assert_eq!(model.generate(None, "hi").await.unwrap(), "limited");
        assert_eq!(inner.calls().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_one_quota() {
        let inner = MockCompletionModel::new();
        inner.push_text("first").await;
        inner.push_text("second").await;
        let model = RateLimitedCompletionModel::new(
            inner.clone(),
            RateLimiter::direct(Quota::per_minute(NonZeroU32::MIN)),
        );
        let clone = model.clone();

        assert_eq!(model.generate(None, "one").await.unwrap(), "first");
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            clone.generate(None, "two"),
        )
        .await;
        assert!(waited.is_err());
        assert_eq!(inner.calls().await, 1);
    }

    #[tokio::test]
    async fn test_raw_response_is_kept() {
        let inner = MockCompletionModel::new();
        inner.push_text("raw").await;
        let model = RateLimitedCompletionModel::new(
            inner,
            RateLimiter::direct(Quota::per_minute(NonZeroU32::MIN)),
        );

        let response = model
            .completion(model.completion_request("hi").build())
            .await
            .unwrap();
        assert_eq!(response.raw_response.into_inner(), "raw");
    }

    #[test]
    fn test_openai_model_builds_with_zero_quota() {
        let config = AnalyzerConfig::builder().llm_requests_per_minute(0).build();
        let _model = new_openai("sk-test", &config);
    }
}
