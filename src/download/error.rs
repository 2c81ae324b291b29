//! Error types for the download module.
//!
//! The `Display` text of each variant is the reason recorded for a failed
//! entry, so messages are written for the failure report reader.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading a PDF.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No URL was supplied.
    #[error("empty URL")]
    EmptyUrl,

    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx HTTP response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The server answered with an HTML page instead of a PDF.
    #[error("response looks like an HTML page ({content_type}), possible paywall/login at {url}")]
    HtmlContent {
        /// The URL that served HTML.
        url: String,
        /// Declared Content-Type header.
        content_type: String,
    },

    /// Strict policy rejected a non-PDF content type.
    #[error("unexpected content type {content_type} from {url}, expected a PDF")]
    DisallowedContentType {
        /// The URL that served the content.
        url: String,
        /// Declared Content-Type header.
        content_type: String,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an HTML-content error.
    pub fn html_content(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self::HtmlContent {
            url: url.into(),
            content_type: content_type.into(),
        }
    }

    /// Creates a disallowed-content-type error.
    pub fn disallowed_content_type(
        url: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::DisallowedContentType {
            url: url.into(),
            content_type: content_type.into(),
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path as context, which the helper constructors take explicitly.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_reason() {
        assert_eq!(DownloadError::EmptyUrl.to_string(), "empty URL");
    }

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://example.com/file.pdf");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/file.pdf"));
    }

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://example.com/file.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/file.pdf"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_html_content_mentions_paywall() {
        let error = DownloadError::html_content("https://example.com/p", "text/html; charset=utf-8");
        let msg = error.to_string();
        assert!(msg.contains("HTML page"), "got: {msg}");
        assert!(msg.contains("paywall/login"), "got: {msg}");
        assert!(msg.contains("text/html"), "got: {msg}");
    }

    #[test]
    fn test_disallowed_content_type_display() {
        let error = DownloadError::disallowed_content_type("https://example.com/x", "image/png");
        let msg = error.to_string();
        assert!(msg.contains("image/png"), "got: {msg}");
        assert!(msg.contains("expected a PDF"), "got: {msg}");
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/test.pdf"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/test.pdf"), "Expected path in: {msg}");
    }

    #[test]
    fn test_download_error_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
    }
}
