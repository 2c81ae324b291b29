//! Shared URL helpers for repository link normalization.

use url::Url;

/// Normalizes a host string: trim, lowercase, then strip a leading "www." and trailing '.'.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim()
        .to_ascii_lowercase()
        .trim_start_matches("www.")
        .trim_end_matches('.')
        .to_string()
}

/// Parses an absolute URL, retrying with an `https://` prefix for scheme-less
/// links such as `arxiv.org/abs/1706.03762`.
#[must_use]
pub fn parse_lenient(link: &str) -> Option<Url> {
    let trimmed = link.trim();
    match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some() => Some(url),
        Ok(_) => None,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}")).ok()
        }
        Err(_) => None,
    }
}
