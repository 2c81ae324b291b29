//! Direct resolver: bibliographic fields to a candidate URL.

use tracing::debug;

use super::arxiv;
use crate::bibliography::BibEntry;

/// Derives a fetchable URL from an entry's own fields.
///
/// Priority, first match wins:
/// 1. `url` is an arXiv abstract or PDF link: rewritten to the canonical `.pdf` URL.
/// 2. `url` is any other non-empty value: returned verbatim.
/// 3. `eprint` marked as arXiv (by value or `archivePrefix`): canonical PDF URL of the cleaned id.
/// 4. Otherwise `None`.
///
/// Pure; whether the URL really serves a PDF is left to the downloader.
#[must_use]
pub fn resolve_direct(entry: &BibEntry) -> Option<String> {
    if let Some(url) = entry.url() {
        let resolved = arxiv::classify(url).map_or_else(|| url.to_string(), |link| link.pdf_url());
        debug!(key = entry.key(), url = %resolved, "resolved from url field");
        return Some(resolved);
    }

    let eprint = entry.eprint()?;
    let resolved = arxiv::eprint_pdf_url(eprint, entry.archive_prefix());
    if let Some(url) = &resolved {
        debug!(key = entry.key(), url = %url, "resolved from eprint");
    }
    resolved
}
