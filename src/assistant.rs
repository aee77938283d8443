//! # Legal Assistant Module
//!
//! Everything the analyzer asks of the language model: summarizing terms, answering
//! questions about them, suggesting questions, and pulling legal sections out of a page
//! that has no dedicated terms link.
//!
//! Without a model the assistant runs in demo mode and answers with fixed text, so the
//! rest of the application keeps working when no API key is configured.

mod questions;

pub use questions::{DEFAULT_QUESTIONS, QUESTION_COUNT, default_questions, parse_questions};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::model::{LanguageModel, LlmError};

/// Characters of page content included in summary, answer and extraction prompts
pub const PROMPT_CONTENT_CHARS: usize = 8000;

/// Characters of page content included in the suggested-questions prompt
pub const QUESTION_CONTENT_CHARS: usize = 5000;

/// Reply of the model when a page has no legal content
pub const NO_LEGAL_CONTENT: &str = "NO_LEGAL_CONTENT";

pub const DEMO_CONTENT: &str = "This is a mock analysis because the OpenAI API key is not configured. In a real scenario, this would contain the actual Terms of Service content.";

pub const DEMO_SUMMARY: &str = "This is a demonstration mode. The application is working correctly, but the OpenAI API key is not configured. Please add your OpenAI API key to the environment variables to enable full functionality.";

pub const DEMO_ANSWER: &str = "I'm in demonstration mode because the OpenAI API key is not configured. In a real scenario, I would analyze the Terms of Service and answer your specific question. Please add your OpenAI API key to enable full functionality.";

pub const SUMMARY_FAILED: &str =
    "Failed to generate summary. Please check your OpenAI API key configuration.";

const ANSWER_PREAMBLE: &str = "You are a helpful expert in interpreting Terms of Service and privacy policies. Your goal is to help users understand how websites use their data in simple, clear language. When information is explicitly stated in the Terms, provide that information accurately. When information isn't explicitly stated, provide a helpful response based on industry standards and reasonable inferences, clearly indicating when you're making an inference. Always aim to give users useful information that helps them understand their rights and the implications of the Terms. Focus on being helpful rather than overly cautious. Also you don't use words in bold lettering and don't use asterisks";

/// Reply to a chat question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
}

/// Prompts and fallbacks around an optional language model
#[derive(Debug, Clone)]
pub struct Assistant<L> {
    model: Option<L>,
}

impl<L: LanguageModel> Assistant<L> {
    /// Assistant backed by a model
    pub fn new(model: L) -> Self {
        Self { model: Some(model) }
    }

    /// Assistant without a model, answering with fixed demonstration text
    pub fn demo() -> Self {
        Self { model: None }
    }

    /// Whether no model is configured
    pub fn is_demo(&self) -> bool {
        self.model.is_none()
    }

    /// Summarize terms with a focus on how user data is collected, used and shared.
    ///
    /// Never fails: demo mode and model errors produce fixed text.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn summarize(&self, content: &str) -> String {
        let Some(model) = &self.model else {
            return DEMO_SUMMARY.to_string();
        };

        match model.generate(None, &summary_prompt(content)).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Error generating ToS summary: {}", e);
                SUMMARY_FAILED.to_string()
            }
        }
    }

    /// Answer a question about terms fetched from `url`
    #[instrument(skip(self, content))]
    pub async fn answer(&self, question: &str, url: &str, content: &str) -> ChatReply {
        let Some(model) = &self.model else {
            return ChatReply {
                message: DEMO_ANSWER.to_string(),
            };
        };

        let message = match model
            .generate(Some(ANSWER_PREAMBLE), &answer_prompt(question, url, content))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!("Error asking about terms: {}", e);
                format!("Error: {}", e)
            }
        };
        ChatReply { message }
    }

    /// Exactly `QUESTION_COUNT` questions a reader might ask about `content`
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn suggest_questions(&self, content: &str) -> Vec<String> {
        let Some(model) = &self.model else {
            return default_questions();
        };

        match model.generate(None, &questions_prompt(content)).await {
            Ok(reply) => parse_questions(&reply),
            Err(e) => {
                error!("Error generating suggested questions: {}", e);
                default_questions()
            }
        }
    }

    /// Ask the model to pull legal sections out of a page.
    ///
    /// `Ok(None)` means there is no model or the model found no legal content.
    pub async fn extract_legal_sections(
        &self,
        url: &str,
        content: &str,
    ) -> Result<Option<String>, LlmError> {
        let Some(model) = &self.model else {
            return Ok(None);
        };

        let reply = model.generate(None, &extraction_prompt(url, content)).await?;
        if reply.trim().is_empty() || reply.contains(NO_LEGAL_CONTENT) {
            debug!("Model reported no legal content on {}", url);
            Ok(None)
        } else {
            info!("Model identified legal content on {}", url);
            Ok(Some(reply))
        }
    }
}

/// The first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

fn summary_prompt(content: &str) -> String {
    format!(
        "Summarize the following Terms of Service content in a clear, concise way, \
         focusing on how user data is collected, used, and shared:\n\n{}",
        truncate_chars(content, PROMPT_CONTENT_CHARS)
    )
}

fn answer_prompt(question: &str, url: &str, content: &str) -> String {
    format!(
        "Based on the following Terms of Service content from {}:\n\n{}\n\n\
         Answer this question: {}\n\n\
         If the information is not explicitly stated in the Terms of Service, you can make \
         reasonable inferences based on industry standards and similar services, but indicate \
         that you're doing so. Always try to provide a helpful answer rather than simply \
         stating the information is not available.",
        url,
        truncate_chars(content, PROMPT_CONTENT_CHARS),
        question
    )
}

fn questions_prompt(content: &str) -> String {
    format!(
        "Based on the following Terms of Service content:\n\n{}\n\n\
         Generate {} specific, relevant questions that a user might want to ask about these terms.\n\
         Focus on privacy, data usage, user rights, and important policies.\n\n\
         IMPORTANT: Return ONLY a plain JSON array of strings with no markdown formatting, \
         no code blocks, and no additional text.\n\
         Example: [\"Question 1?\", \"Question 2?\", \"Question 3?\", \"Question 4?\", \"Question 5?\"]",
        truncate_chars(content, QUESTION_CONTENT_CHARS),
        QUESTION_COUNT
    )
}

fn extraction_prompt(url: &str, content: &str) -> String {
    format!(
        "Analyze the following text from {} and determine if it contains Terms of Service, \
         Privacy Policy, or similar legal content. If it does, extract only the relevant legal \
         sections. If it doesn't contain any legal content, respond with \"{}\".\n\n\
         Text to analyze:\n{}",
        url,
        NO_LEGAL_CONTENT,
        truncate_chars(content, PROMPT_CONTENT_CHARS)
    )
}
