//! Content-type gate applied before any bytes reach disk.

use crate::config::ContentTypePolicy;

use super::constants::{HTML_MEDIA_TYPES, PDF_MEDIA_TYPES};
use super::error::DownloadError;

/// Checks a response's declared `Content-Type` against `policy`.
///
/// HTML is rejected under both policies with [`DownloadError::HtmlContent`].
/// A missing header is accepted under both.
pub(crate) fn check(
    policy: ContentTypePolicy,
    content_type: Option<&str>,
    url: &str,
) -> Result<(), DownloadError> {
    let Some(raw) = content_type else {
        return Ok(());
    };
    let media_type = media_type(raw);

    if PDF_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Ok(());
    }
    if HTML_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Err(DownloadError::html_content(url, raw));
    }
    match policy {
        ContentTypePolicy::Permissive => {
            tracing::debug!(url, content_type = raw, "non-PDF content type allowed through");
            Ok(())
        }
        ContentTypePolicy::Strict => Err(DownloadError::disallowed_content_type(url, raw)),
    }
}

/// `"Text/HTML; charset=utf-8"` -> `"text/html"`.
fn media_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
