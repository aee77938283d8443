//! Normalization of user-supplied website addresses

use tracing::debug;
use url::Url;

use crate::crawler::HREF_KEYWORD_GROUPS;
use crate::error::{Error, Result};

/// Turn a bare domain or URL into an absolute URL.
///
/// Input without an `http://` or `https://` prefix gets `https://` prepended. Nothing
/// beyond parsing is checked: no DNS lookup, no reachability test.
pub fn normalize_url(input: &str) -> Result<Url> {
    let candidate = normalize_address(input);
    Url::parse(&candidate).map_err(|e| {
        debug!("Rejecting {:?}: {}", candidate, e);
        Error::InvalidUrl(candidate)
    })
}

/// The trimmed input with `https://` prepended when it has no http(s) scheme.
///
/// This is the address reported back to the user, so it keeps the input's spelling
/// (no trailing slash is added).
pub fn normalize_address(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Whether the URL itself already looks like a legal page (terms, privacy, eula...)
pub fn looks_like_legal_url(url: &Url) -> bool {
    let lower = url.as_str().to_lowercase();
    HREF_KEYWORD_GROUPS
        .iter()
        .flat_map(|group| group.iter())
        .any(|keyword| lower.contains(keyword))
}
