//! Shared User-Agent strings for download and search HTTP clients.

/// Project URL for User-Agent identification on API traffic.
const PROJECT_UA_URL: &str = "https://github.com/fierce/bibfetch";

/// Desktop browser User-Agent sent with PDF downloads.
///
/// Publisher sites commonly reject tool-identifying agents outright, so the
/// downloader presents itself as a regular browser by default.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// User-Agent for search API requests (identifies the tool).
#[must_use]
pub(crate) fn default_search_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bibfetch/{version} (research-tool; +{PROJECT_UA_URL})")
}
