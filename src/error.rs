//! Error types for the termslens crate

use thiserror::Error;

use crate::crawler::FetchError;
use crate::model::LlmError;

/// Result type for termslens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for termslens operations
#[derive(Debug, Error)]
pub enum Error {
    /// The user input could not be turned into an absolute URL
    #[error("Invalid URL: {0}. Please enter a valid website address.")]
    InvalidUrl(String),

    /// The main page of the site could not be fetched
    #[error("Failed to fetch website: {0}")]
    MainPage(#[source] FetchError),

    /// The demo-mode reachability probe got a response but not a 2xx one
    #[error("Failed to fetch website: {status}")]
    ProbeStatus {
        /// Status line of the probe response, e.g. `404 Not Found`
        status: String,
    },

    /// The demo-mode reachability probe could not reach the site
    #[error("Failed to access the website: {0}")]
    Unreachable(#[source] FetchError),

    /// Every stage of the pipeline ran without finding usable content
    #[error("{}", no_content_message(.failed_links))]
    NoContentFound {
        /// Number of discovered candidate links whose fetch failed
        failed_links: usize,
    },

    /// Language model error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

fn no_content_message(failed_links: &usize) -> String {
    let mut message = String::from(
        "Could not find Terms of Service content. Try providing a direct link to the Terms of Service page.",
    );
    if *failed_links > 0 {
        message.push_str(&format!(
            " Attempted to fetch {} potential ToS links but encountered errors.",
            failed_links
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_content_message_without_failures() {
        let err = Error::NoContentFound { failed_links: 0 };
        assert_eq!(
            err.to_string(),
            "Could not find Terms of Service content. Try providing a direct link to the Terms of Service page."
        );
    }

    #[test]
    fn test_no_content_message_counts_failures() {
        let err = Error::NoContentFound { failed_links: 3 };
        assert!(
            err.to_string()
                .ends_with("Attempted to fetch 3 potential ToS links but encountered errors.")
        );
    }

    #[test]
    fn test_invalid_url_message() {
        let err = Error::InvalidUrl("https://exa mple".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid URL: https://exa mple. Please enter a valid website address."
        );
    }
}
