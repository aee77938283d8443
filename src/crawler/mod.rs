//! # Legal Page Crawler Module
//!
//! This module holds everything that touches a target website: fetching pages with a
//! rotating User-Agent, discovering candidate Terms-of-Service links in fetched HTML,
//! turning HTML into readable text, and looking domains up in the known-site table.
//!
//! ## Key Components
//!
//! - `Fetcher`: GET with a hard deadline, retried across the configured User-Agents
//! - `discover_links`: anchor-text matching with an href-pattern fallback
//! - `extract_text_content`: paragraphs, then divs, then everything, minus boilerplate tags
//! - `resolve_known_links`: substring lookup in the known-site table
//! - `FetchError`: typed failures (timeout, status, network, content too short)
//!
//! All functions here are stateless apart from the `reqwest` connection pool held by
//! the `Fetcher`, so one crawler can be shared by concurrent analyses.

mod content_extraction;
mod error;
mod fetcher;
mod known_sites;
mod links;

pub use content_extraction::{MIN_HTML_LENGTH, extract_text_content};
pub use error::FetchError;
pub use fetcher::{Fetcher, Page};
pub use known_sites::{KnownLinks, resolve_known_links};
pub use links::discover_links;

pub(crate) use links::HREF_KEYWORD_GROUPS;

use serde::Serialize;
use url::Url;

/// Where a candidate link came from. Variants are listed in the order candidates are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    /// Entry in the known-site table
    KnownSite,

    /// Anchor whose visible text mentions terms, privacy or legal
    AnchorText,

    /// Any `href` whose value contains a legal keyword
    HrefPattern,
}

/// A URL believed to lead to a Terms of Service or Privacy Policy page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Absolute http(s) URL
    pub url: Url,

    /// How the link was found
    pub source: LinkSource,
}

impl CandidateLink {
    pub fn new(url: Url, source: LinkSource) -> Self {
        Self { url, source }
    }
}
