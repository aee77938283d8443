//! # Analyzer Module
//!
//! The analysis pipeline: given a user-supplied address, find the site's Terms of Service
//! (or Privacy Policy), extract its text and summarize it.
//!
//! The pipeline is an ordered list of [`Stage`]s evaluated against a per-request
//! [`Investigation`]. The first stage that yields content ends the search:
//!
//! 1. `KnownLinks`: pages listed for the host in the known-site table
//! 2. `DirectGuess`: the input itself, when its URL looks like a legal page
//! 3. `MainPage`: fetch the input page; failing here aborts the analysis
//! 4. `Discovery`: links on the main page that look like legal pages
//! 5. `KeywordFallback`: the main page itself, when it is long and mentions legal terms
//! 6. `AiFallback`: legal sections the language model extracts from the main page
//!
//! Without a language model the analyzer runs in demo mode: it only checks that the
//! site answers and returns fixed demonstration text.

mod result;

pub use result::{Analysis, AnalysisResult};

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::address::{looks_like_legal_url, normalize_address, normalize_url};
use crate::assistant::{Assistant, ChatReply, DEMO_CONTENT, DEMO_SUMMARY};
use crate::config::AnalyzerConfig;
use crate::crawler::{Fetcher, discover_links, extract_text_content, resolve_known_links};
use crate::error::{Error, Result};
use crate::model::{LanguageModel, OpenAiModel, openai_from_env};

/// Extracted text must be longer than this many characters to count as found
pub const FOUND_MIN_CHARS: usize = 500;

/// Main-page text must be longer than this many characters for the fallbacks to run
pub const MAIN_PAGE_MIN_CHARS: usize = 1000;

/// Phrases that make a long main page count as legal content on its own
pub const LEGAL_PHRASES: [&str; 6] = [
    "terms of service",
    "terms and conditions",
    "user agreement",
    "privacy policy",
    "data policy",
    "legal agreement",
];

/// One step of the search for legal content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    KnownLinks,
    DirectGuess,
    MainPage,
    Discovery,
    KeywordFallback,
    AiFallback,
}

impl Stage {
    /// Stages in evaluation order
    pub const ORDER: [Stage; 6] = [
        Stage::KnownLinks,
        Stage::DirectGuess,
        Stage::MainPage,
        Stage::Discovery,
        Stage::KeywordFallback,
        Stage::AiFallback,
    ];
}

/// Legal content accepted by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub url: Url,
    pub content: String,
    pub stage: Stage,
}

/// The main page as fetched by the `MainPage` stage
#[derive(Debug, Clone)]
struct MainPage {
    html: String,
    text: String,
}

/// A candidate page that could not be fetched
#[derive(Debug, Clone)]
pub struct FailedLink {
    pub url: Url,
    pub reason: String,
}

/// State shared by the stages of one analysis
#[derive(Debug, Clone)]
pub struct Investigation {
    /// Normalized input URL
    url: Url,

    main_page: Option<MainPage>,

    /// Discovered links whose fetch failed
    failures: Vec<FailedLink>,
}

impl Investigation {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            main_page: None,
            failures: Vec::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn failures(&self) -> &[FailedLink] {
        &self.failures
    }

    /// Main-page text when it is long enough for the fallbacks
    fn long_main_text(&self) -> Option<&str> {
        self.main_page
            .as_ref()
            .map(|page| page.text.as_str())
            .filter(|text| text.chars().count() > MAIN_PAGE_MIN_CHARS)
    }
}

/// Whether extracted text is long enough to be accepted as legal content
pub fn is_substantial(content: &str) -> bool {
    content.chars().count() > FOUND_MIN_CHARS
}

/// Whether text mentions one of the legal phrases, ignoring case
pub fn mentions_legal_terms(text: &str) -> bool {
    let lowered = text.to_lowercase();
    LEGAL_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Finds, extracts and summarizes the legal terms of websites
#[derive(Clone)]
pub struct Analyzer<L> {
    config: Arc<AnalyzerConfig>,
    fetcher: Fetcher,
    assistant: Assistant<L>,
}

impl Analyzer<OpenAiModel> {
    /// Analyzer backed by OpenAI when `OPENAI_API_KEY` is set, in demo mode otherwise
    pub fn from_env(config: AnalyzerConfig) -> Result<Self> {
        let model = openai_from_env(&config);
        Self::new(config, model)
    }
}

impl<L: LanguageModel> Analyzer<L> {
    /// Create an analyzer; `None` for the model selects demo mode
    pub fn new(config: AnalyzerConfig, model: Option<L>) -> Result<Self> {
        let fetcher = Fetcher::new(config.user_agents.clone())
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;
        let assistant = match model {
            Some(model) => Assistant::new(model),
            None => Assistant::demo(),
        };

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            assistant,
        })
    }

    /// Create an analyzer in demo mode
    pub fn demo(config: AnalyzerConfig) -> Result<Self> {
        Self::new(config, None)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn is_demo(&self) -> bool {
        self.assistant.is_demo()
    }

    /// Find the legal terms of the site at `input` and summarize them
    #[instrument(skip(self))]
    pub async fn analyze(&self, input: &str) -> Result<Analysis> {
        let url = normalize_url(input)?;
        let address = normalize_address(input);

        if self.is_demo() {
            return self.demo_analysis(url, address).await;
        }

        let found = self.investigate(url.clone()).await?;
        let summary = self.assistant.summarize(&found.content).await;

        // Content taken from the input page is reported under the address as typed
        let source = if found.url == url {
            address
        } else {
            found.url.to_string()
        };

        Ok(Analysis {
            url: source,
            content: found.content,
            summary,
            stage: Some(found.stage),
        })
    }

    /// Answer a question about a previous analysis
    #[instrument(skip(self, analysis), fields(url = %analysis.url))]
    pub async fn ask(&self, question: &str, analysis: &Analysis) -> ChatReply {
        self.assistant
            .answer(question, &analysis.url, &analysis.content)
            .await
    }

    /// Questions a reader might ask about `content`
    #[instrument(skip(self, content))]
    pub async fn suggest_questions(&self, content: &str) -> Vec<String> {
        self.assistant.suggest_questions(content).await
    }

    /// Run the stages in order until one yields legal content
    pub async fn investigate(&self, url: Url) -> Result<Found> {
        let mut investigation = Investigation::new(url);

        for stage in Stage::ORDER {
            debug!("Running stage {:?} for {}", stage, investigation.url);
            if let Some(found) = self.run_stage(stage, &mut investigation).await? {
                info!(
                    "Found {} characters of legal content at {} ({:?})",
                    found.content.chars().count(),
                    found.url,
                    stage
                );
                return Ok(found);
            }
        }

        warn!(
            "No legal content found for {} after {} failed links",
            investigation.url,
            investigation.failures.len()
        );
        Err(Error::NoContentFound {
            failed_links: investigation.failures.len(),
        })
    }

    /// Evaluate a single stage. `Ok(None)` hands over to the next stage.
    pub async fn run_stage(
        &self,
        stage: Stage,
        investigation: &mut Investigation,
    ) -> Result<Option<Found>> {
        match stage {
            Stage::KnownLinks => {
                let host = investigation.url.host_str().unwrap_or_default();
                let known = resolve_known_links(host, &self.config.known_sites);
                for candidate in known.candidates() {
                    if let Some(content) = self.fetch_candidate(&candidate.url).await {
                        return Ok(Some(Found {
                            url: candidate.url,
                            content,
                            stage,
                        }));
                    }
                }
                Ok(None)
            }
            Stage::DirectGuess => {
                if !looks_like_legal_url(&investigation.url) {
                    return Ok(None);
                }
                let url = investigation.url.clone();
                Ok(self
                    .fetch_candidate(&url)
                    .await
                    .map(|content| Found { url, content, stage }))
            }
            Stage::MainPage => {
                let page = self
                    .fetcher
                    .fetch_page(investigation.url.as_str(), self.config.page_timeout())
                    .await
                    .map_err(Error::MainPage)?;
                let text = extract_text_content(&page.html);
                debug!(
                    "Main page {} has {} characters of text",
                    page.url,
                    text.chars().count()
                );
                investigation.main_page = Some(MainPage {
                    html: page.html,
                    text,
                });
                Ok(None)
            }
            Stage::Discovery => {
                let Some(main_page) = &investigation.main_page else {
                    return Ok(None);
                };
                let candidates = discover_links(&main_page.html, &investigation.url);
                debug!("Discovered {} candidate links", candidates.len());

                for candidate in candidates {
                    match self
                        .fetcher
                        .fetch_text(candidate.url.as_str(), self.config.page_timeout())
                        .await
                    {
                        Ok(content) if is_substantial(&content) => {
                            return Ok(Some(Found {
                                url: candidate.url,
                                content,
                                stage,
                            }));
                        }
                        Ok(content) => {
                            debug!(
                                "Skipping {}: only {} characters",
                                candidate.url,
                                content.chars().count()
                            );
                        }
                        Err(e) => {
                            warn!("Error fetching ToS from {}: {}", candidate.url, e);
                            investigation.failures.push(FailedLink {
                                url: candidate.url,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                Ok(None)
            }
            Stage::KeywordFallback => {
                let Some(text) = investigation.long_main_text() else {
                    return Ok(None);
                };
                if !mentions_legal_terms(text) {
                    return Ok(None);
                }
                Ok(Some(Found {
                    url: investigation.url.clone(),
                    content: text.to_string(),
                    stage,
                }))
            }
            Stage::AiFallback => {
                let Some(text) = investigation.long_main_text() else {
                    return Ok(None);
                };
                match self
                    .assistant
                    .extract_legal_sections(investigation.url.as_str(), text)
                    .await
                {
                    Ok(Some(content)) => Ok(Some(Found {
                        url: investigation.url.clone(),
                        content,
                        stage,
                    })),
                    Ok(None) => Ok(None),
                    Err(e) => {
                        error!("Error using AI to analyze content: {}", e);
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Fetch a candidate and keep its text only when it is substantial
    async fn fetch_candidate(&self, url: &Url) -> Option<String> {
        match self
            .fetcher
            .fetch_text(url.as_str(), self.config.page_timeout())
            .await
        {
            Ok(content) if is_substantial(&content) => Some(content),
            Ok(content) => {
                debug!("Skipping {}: only {} characters", url, content.chars().count());
                None
            }
            Err(e) => {
                debug!("Could not fetch {}: {}", url, e);
                None
            }
        }
    }

    /// Demo mode: check that the site answers, then return fixed text
    async fn demo_analysis(&self, url: Url, address: String) -> Result<Analysis> {
        info!("No language model configured, running demo analysis for {}", url);
        let status = self
            .fetcher
            .probe(url.as_str(), self.config.probe_timeout())
            .await
            .map_err(Error::Unreachable)?;

        if !status.is_success() {
            return Err(Error::ProbeStatus {
                status: status.to_string(),
            });
        }

        Ok(Analysis {
            url: address,
            content: DEMO_CONTENT.to_string(),
            summary: DEMO_SUMMARY.to_string(),
            stage: None,
        })
    }
}
