//! Lookup of legal pages for well-known domains

use tracing::warn;
use url::Url;

use crate::config::KnownSite;
use crate::crawler::{CandidateLink, LinkSource};

/// Legal pages known for a host. Both fields are `None` when the host is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownLinks {
    /// Terms of Service page
    pub terms: Option<Url>,

    /// Privacy Policy page
    pub privacy: Option<Url>,
}

impl KnownLinks {
    /// Whether no legal page is known
    pub fn is_empty(&self) -> bool {
        self.terms.is_none() && self.privacy.is_none()
    }

    /// Known pages in the order they should be tried: terms, then privacy
    pub fn candidates(&self) -> Vec<CandidateLink> {
        [&self.terms, &self.privacy]
            .into_iter()
            .flatten()
            .map(|url| CandidateLink::new(url.clone(), LinkSource::KnownSite))
            .collect()
    }
}

/// Find the known legal pages for `host`.
///
/// A table entry matches when its domain is a substring of the host, so subdomains
/// resolve to their parent's entry. The first matching entry wins.
pub fn resolve_known_links(host: &str, table: &[KnownSite]) -> KnownLinks {
    let Some(site) = table.iter().find(|site| host.contains(site.domain.as_str())) else {
        return KnownLinks::default();
    };

    KnownLinks {
        terms: site.terms.as_deref().and_then(|raw| parse_entry(site, raw)),
        privacy: site.privacy.as_deref().and_then(|raw| parse_entry(site, raw)),
    }
}

fn parse_entry(site: &KnownSite, raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Ignoring known-site URL {:?} for {}: {}", raw, site.domain, e);
            None
        }
    }
}
