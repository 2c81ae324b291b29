//! arXiv link patterns: abstract pages, PDF links, and eprint identifiers.

use super::utils::{canonical_host, parse_lenient};

const ARXIV_BASE_URL: &str = "https://arxiv.org";
const ARXIV_HOSTS: [&str; 2] = ["arxiv.org", "export.arxiv.org"];
const ARXIV_LABEL: &str = "arxiv:";

/// Classified arXiv link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArxivLink {
    /// `/abs/<id>` page.
    Abstract(String),
    /// `/pdf/<id>[.pdf]` link, holding the identifier without suffix.
    Pdf(String),
}

impl ArxivLink {
    /// Canonical PDF URL for this link.
    pub(crate) fn pdf_url(&self) -> String {
        match self {
            Self::Abstract(id) | Self::Pdf(id) => pdf_url_for_id(id),
        }
    }
}

/// Classifies `link` when it points at an arXiv abstract or PDF path.
pub(crate) fn classify(link: &str) -> Option<ArxivLink> {
    let parsed = parse_lenient(link)?;
    let host = canonical_host(parsed.host_str()?);
    if !ARXIV_HOSTS.contains(&host.as_str()) {
        return None;
    }

    let path = parsed.path();
    if let Some(id) = path.strip_prefix("/abs/") {
        let id = id.trim_matches('/');
        return (!id.is_empty()).then(|| ArxivLink::Abstract(id.to_string()));
    }
    if let Some(rest) = path.strip_prefix("/pdf/") {
        let rest = rest.trim_matches('/');
        let id = rest.strip_suffix(".pdf").unwrap_or(rest);
        return (!id.is_empty()).then(|| ArxivLink::Pdf(id.to_string()));
    }
    None
}

/// Builds the canonical PDF URL for an eprint when the entry marks it as arXiv.
///
/// The eprint qualifies if it mentions arXiv itself (`arXiv:1706.03762`) or
/// the entry's `archivePrefix` is `arXiv`. A leading `arXiv:` label is removed.
pub(crate) fn eprint_pdf_url(eprint: &str, archive_prefix: Option<&str>) -> Option<String> {
    let mentions_arxiv = eprint.to_ascii_lowercase().contains("arxiv");
    let prefixed = archive_prefix.is_some_and(|prefix| prefix.trim().eq_ignore_ascii_case("arxiv"));
    if !mentions_arxiv && !prefixed {
        return None;
    }

    let id = clean_eprint(eprint);
    (!id.is_empty()).then(|| pdf_url_for_id(id))
}

/// Strips the `arXiv:` label (any case) and surrounding whitespace.
pub(crate) fn clean_eprint(eprint: &str) -> &str {
    let trimmed = eprint.trim();
    match trimmed.get(..ARXIV_LABEL.len()) {
        Some(head) if head.eq_ignore_ascii_case(ARXIV_LABEL) => trimmed[ARXIV_LABEL.len()..].trim(),
        _ => trimmed,
    }
}

fn pdf_url_for_id(id: &str) -> String {
    format!("{ARXIV_BASE_URL}/pdf/{id}.pdf")
}
