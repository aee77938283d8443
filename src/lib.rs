//! # termslens - Terms of Service analysis for Rust
//!
//! This crate finds a website's Terms of Service (or Privacy Policy), extracts the
//! readable text and summarizes it with a large language model. Follow-up questions about
//! the terms can be answered against the extracted text.
//!
//! ## Features
//!
//! - Known legal pages for popular sites, with link discovery for everything else
//! - Fetching with a hard deadline and User-Agent rotation
//! - HTML text extraction that skips navigation, scripts and page chrome
//! - Rate-limited OpenAI completions, with a demo mode when no API key is configured
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use termslens::analyzer::Analyzer;
//! use termslens::config::AnalyzerConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Uses OPENAI_API_KEY when set, demo mode otherwise
//!     let analyzer = Analyzer::from_env(AnalyzerConfig::default())?;
//!
//!     let analysis = analyzer.analyze("github.com").await?;
//!     println!("{}\n\n{}", analysis.url, analysis.summary);
//!
//!     let reply = analyzer.ask("Can they use my code?", &analysis).await;
//!     println!("{}", reply.message);
//!     Ok(())
//! }
//! ```

mod error;

pub mod address;
pub mod analyzer;
pub mod assistant;
pub mod config;
pub mod crawler;
pub mod model;
pub mod telemetry;

pub use error::{Error, Result};

/// Re-export of the types most callers need
pub mod prelude {
    pub use crate::analyzer::{Analysis, AnalysisResult, Analyzer};
    pub use crate::assistant::ChatReply;
    pub use crate::config::AnalyzerConfig;
    pub use crate::error::Error;
    pub use crate::error::Result;
}
