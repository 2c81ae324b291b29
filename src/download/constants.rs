//! Constants for the download module (timeouts, buffering, content types).

/// Upper bound on the TCP/TLS connect phase, in seconds. The configured
/// per-call timeout still applies when it is shorter.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Write buffer size for streaming a response body to disk.
pub const WRITE_BUFFER_SIZE: usize = 8192;

/// Media types accepted under the strict content-type policy.
pub const PDF_MEDIA_TYPES: [&str; 3] = ["application/pdf", "application/x-pdf", "application/octet-stream"];

/// Media types treated as an HTML page (paywall, login wall, landing page).
pub const HTML_MEDIA_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];
