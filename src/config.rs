//! # Analyzer Configuration Module
//!
//! This module provides configuration options for the Terms-of-Service analyzer:
//! fetch deadlines, the User-Agent rotation, the known-site table and LLM settings.
//!
//! ## Key Components
//!
//! - `AnalyzerConfig`: timeouts, User-Agent rotation, the known-site table and LLM settings
//! - `AnalyzerConfigBuilder`: fluent construction of an `AnalyzerConfig`
//! - `USER_AGENTS` and `KNOWN_SITES`: the built-in read-only tables
//!
//! The built-in tables are process-wide constants. `AnalyzerConfig::default()` copies
//! them, so every analyzer owns its configuration and nothing is mutated after start-up.

use std::time::Duration;

/// User-Agent strings tried in order by every fetch: one generic, three browsers.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (compatible; TermsAnalyzer/1.0)",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
];

/// Sites whose legal pages are known up front, as (domain, terms, privacy).
/// Order matters: first match wins.
pub const KNOWN_SITES: [(&str, &str, &str); 7] = [
    (
        "supabase.com",
        "https://supabase.com/terms",
        "https://supabase.com/privacy",
    ),
    (
        "vercel.com",
        "https://vercel.com/legal/terms",
        "https://vercel.com/legal/privacy-policy",
    ),
    (
        "github.com",
        "https://docs.github.com/en/site-policy/github-terms/github-terms-of-service",
        "https://docs.github.com/en/site-policy/privacy-policies/github-privacy-statement",
    ),
    (
        "facebook.com",
        "https://www.facebook.com/terms.php",
        "https://www.facebook.com/privacy/policy/",
    ),
    (
        "twitter.com",
        "https://twitter.com/tos",
        "https://twitter.com/privacy",
    ),
    (
        "google.com",
        "https://policies.google.com/terms",
        "https://policies.google.com/privacy",
    ),
    (
        "cognition.ai",
        "https://cognition.ai/pages/terms-of-service",
        "https://cognition.ai/pages/privacy-policy",
    ),
];

/// Default model used for summaries, answers and legal-section extraction
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// A known-site table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownSite {
    /// Substring matched against the request's hostname
    pub domain: String,

    /// Terms of Service page
    pub terms: Option<String>,

    /// Privacy Policy page
    pub privacy: Option<String>,
}

impl KnownSite {
    /// Create an entry with both legal pages
    pub fn new(
        domain: impl Into<String>,
        terms: impl Into<String>,
        privacy: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            terms: Some(terms.into()),
            privacy: Some(privacy.into()),
        }
    }
}

/// Configuration for the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// User-Agent strings, tried in order on every fetch
    pub user_agents: Vec<String>,

    /// Known-site table, searched in order
    pub known_sites: Vec<KnownSite>,

    /// Deadline for main-page and candidate fetches in milliseconds
    pub page_timeout_ms: u64,

    /// Deadline for the demo-mode reachability probe in milliseconds
    pub probe_timeout_ms: u64,

    /// Model name passed to the LLM provider
    pub model: String,

    /// LLM requests allowed per minute
    pub llm_requests_per_minute: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            user_agents: USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            known_sites: KNOWN_SITES
                .iter()
                .map(|(domain, terms, privacy)| KnownSite::new(*domain, *terms, *privacy))
                .collect(),
            page_timeout_ms: 15_000,
            probe_timeout_ms: 10_000,
            model: DEFAULT_MODEL.to_string(),
            llm_requests_per_minute: 60,
        }
    }
}

/// Builder for AnalyzerConfig
#[derive(Debug, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
        }
    }

    /// Set the User-Agent rotation
    pub fn user_agents(mut self, user_agents: Vec<String>) -> Self {
        self.config.user_agents = user_agents;
        self
    }

    /// Replace the known-site table
    pub fn known_sites(mut self, known_sites: Vec<KnownSite>) -> Self {
        self.config.known_sites = known_sites;
        self
    }

    /// Set the page fetch deadline in milliseconds
    pub fn page_timeout_ms(mut self, page_timeout_ms: u64) -> Self {
        self.config.page_timeout_ms = page_timeout_ms;
        self
    }

    /// Set the demo-mode probe deadline in milliseconds
    pub fn probe_timeout_ms(mut self, probe_timeout_ms: u64) -> Self {
        self.config.probe_timeout_ms = probe_timeout_ms;
        self
    }

    /// Set the LLM model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the LLM request quota
    pub fn llm_requests_per_minute(mut self, llm_requests_per_minute: u32) -> Self {
        self.config.llm_requests_per_minute = llm_requests_per_minute;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}

impl AnalyzerConfig {
    /// Create a new builder
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }

    /// Get the page fetch deadline as a Duration
    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    /// Get the probe deadline as a Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
