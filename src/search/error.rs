//! Error types for the search fallback.

use thiserror::Error;

/// Why a search did not produce a PDF candidate.
///
/// The `Display` text is the reason recorded for the entry.
#[derive(Debug, Error)]
pub enum SearchError {
    /// API key or engine id is unset or still a template placeholder.
    #[error("search credentials not configured (set search.api_key and search.engine_id)")]
    MissingCredentials,

    /// The provider rejected the request for quota reasons.
    #[error("search quota exceeded (HTTP 429)")]
    QuotaExceeded,

    /// Any other non-2xx response.
    #[error("search request failed with HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    HttpStatus {
        status: u16,
        /// Provider error message, when the body carried one.
        message: Option<String>,
    },

    /// The configured endpoint is not a valid URL.
    #[error("invalid search endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, TLS or timeout failure.
    #[error("search request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON shape.
    #[error("unexpected search response: {message}")]
    InvalidResponse { message: String },

    /// The response carried no results list.
    #[error("search found no results")]
    NoResults,

    /// Results were returned but none looked like a PDF.
    #[error("no obvious PDF link in search results")]
    NoPdfLink,
}
