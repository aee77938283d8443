//! Discovery of candidate Terms-of-Service links in a fetched page

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::crawler::content_extraction::collapse_whitespace;
use crate::crawler::{CandidateLink, LinkSource};

/// Anchor-text keywords, scanned in this priority order
const ANCHOR_TEXT_KEYWORDS: [&str; 4] = ["terms of service", "terms", "privacy policy", "legal"];

/// Keyword groups for `href` values, one scan per group
pub(crate) const HREF_KEYWORD_GROUPS: [&[&str]; 3] = [
    &[
        "terms",
        "tos",
        "terms-of-service",
        "terms-and-conditions",
        "legal",
        "user-agreement",
    ],
    &["privacy", "privacy-policy", "data-policy", "data-protection"],
    &["legal", "disclaimer", "eula", "agreement"],
];

/// Find candidate legal-page links in `html`, resolved against `page_url`.
///
/// Anchors whose visible text mentions terms, privacy or legal are preferred. Only when
/// none are found does the href-pattern scan run. The result holds absolute http(s)
/// URLs, de-duplicated, in first-seen order.
pub fn discover_links(html: &str, page_url: &Url) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);

    let by_text = links_by_anchor_text(&document, page_url);
    if !by_text.is_empty() {
        debug!("Found {} links by anchor text", by_text.len());
        return by_text;
    }

    let by_href = links_by_href_pattern(&document, page_url);
    debug!("Found {} links by href pattern", by_href.len());
    by_href
}

fn links_by_anchor_text(document: &Html, page_url: &Url) -> Vec<CandidateLink> {
    let Some(selector) = selector("a[href]") else {
        return Vec::new();
    };

    let anchors: Vec<(String, &str)> = document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let text = collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
            Some((text.to_lowercase(), href))
        })
        .collect();

    let mut links = Vec::new();
    for keyword in ANCHOR_TEXT_KEYWORDS {
        for (text, href) in &anchors {
            if text.contains(keyword) {
                if let Some(url) = resolve_href(href, page_url) {
                    links.push(CandidateLink::new(url, LinkSource::AnchorText));
                }
            }
        }
    }

    dedup_links(links)
}

fn links_by_href_pattern(document: &Html, page_url: &Url) -> Vec<CandidateLink> {
    let Some(selector) = selector("[href]") else {
        return Vec::new();
    };

    let hrefs: Vec<&str> = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .collect();

    let mut links = Vec::new();
    for group in HREF_KEYWORD_GROUPS {
        for href in &hrefs {
            let lower = href.to_lowercase();
            if group.iter().any(|keyword| lower.contains(keyword)) {
                if let Some(url) = resolve_href(href, page_url) {
                    links.push(CandidateLink::new(url, LinkSource::HrefPattern));
                }
            }
        }
    }

    dedup_links(links)
}

/// Resolve an `href` against the page URL.
///
/// An href starting with `/` is appended to the page's scheme and host (port included),
/// so `//host/path` stays on the page's host. Other relative forms use standard
/// base-URL joining and absolute URLs pass through. Anything that is not http(s)
/// afterwards (`mailto:`, `javascript:`) is dropped.
fn resolve_href(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = if href.starts_with('/') {
        let host = page_url.host_str()?;
        let origin = match page_url.port() {
            Some(port) => format!("{}://{}:{}", page_url.scheme(), host, port),
            None => format!("{}://{}", page_url.scheme(), host),
        };
        Url::parse(&format!("{}{}", origin, href))
    } else {
        page_url.join(href)
    };

    match resolved {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            debug!("Skipping non-http link {}", url);
            None
        }
        Err(e) => {
            debug!("Skipping malformed href {:?}: {}", href, e);
            None
        }
    }
}

fn dedup_links(links: Vec<CandidateLink>) -> Vec<CandidateLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.url.as_str().to_string()))
        .collect()
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Failed to parse selector '{}': {:?}", css, e);
            None
        }
    }
}
