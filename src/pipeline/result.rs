//! Per-entry outcome records.

use std::fmt;

use crate::bibliography::BibEntry;

/// DOI recorded for entries without one.
pub const DOI_PLACEHOLDER: &str = "N/A";

/// Where the attempted URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// The entry's own `url` or `eprint` field.
    BibTeX,
    /// The search fallback.
    Search,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BibTeX => "BibTeX",
            Self::Search => "Search",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Downloaded,
    AlreadyPresent,
    Failed(String),
}

/// Final state of one bibliography entry.
///
/// A success never carries a reason and a failure always does; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    title: String,
    doi: String,
    source: ResolutionSource,
    url: Option<String>,
    outcome: Outcome,
}

impl ResolutionResult {
    /// The file was downloaded from `url`.
    #[must_use]
    pub fn succeeded(entry: &BibEntry, url: impl Into<String>, source: ResolutionSource) -> Self {
        Self::from_entry(entry, source, Some(url.into()), Outcome::Downloaded)
    }

    /// The destination file already existed; nothing was fetched.
    #[must_use]
    pub fn skipped(entry: &BibEntry) -> Self {
        Self::from_entry(entry, ResolutionSource::BibTeX, None, Outcome::AlreadyPresent)
    }

    /// The entry could not be retrieved.
    #[must_use]
    pub fn failed(
        entry: &BibEntry,
        source: ResolutionSource,
        url: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::from_entry(entry, source, url, Outcome::Failed(reason.into()))
    }

    /// Failure for an entry whose task ended abnormally.
    #[must_use]
    pub fn internal_error(title: impl Into<String>, doi: impl Into<String>, message: &str) -> Self {
        Self {
            title: title.into(),
            doi: doi.into(),
            source: ResolutionSource::BibTeX,
            url: None,
            outcome: Outcome::Failed(format!("internal error: {message}")),
        }
    }

    fn from_entry(
        entry: &BibEntry,
        source: ResolutionSource,
        url: Option<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            title: entry.title().to_string(),
            doi: entry.doi().unwrap_or(DOI_PLACEHOLDER).to_string(),
            source,
            url,
            outcome,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// DOI, or `"N/A"`.
    #[must_use]
    pub fn doi(&self) -> &str {
        &self.doi
    }

    #[must_use]
    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    /// URL that was (or would have been) downloaded.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed(_))
    }

    /// True when success came from an existing file.
    #[must_use]
    pub fn was_skipped(&self) -> bool {
        self.outcome == Outcome::AlreadyPresent
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed(reason) => Some(reason),
            Outcome::Downloaded | Outcome::AlreadyPresent => None,
        }
    }

    /// `https://doi.org/<doi>` when the entry has a DOI.
    #[must_use]
    pub fn doi_link(&self) -> Option<String> {
        (self.doi != DOI_PLACEHOLDER).then(|| format!("https://doi.org/{}", self.doi))
    }
}
