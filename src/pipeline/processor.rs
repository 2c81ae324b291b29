//! Per-entry state machine: skip, resolve, search, download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use super::result::{ResolutionResult, ResolutionSource};
use crate::bibliography::BibEntry;
use crate::download::Downloader;
use crate::filename::{default_file_name, sanitize};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::resolver::resolve_direct;
use crate::search::SearchClient;

/// Resolves and downloads single entries into one output directory.
///
/// Every expected failure (no link, search error, download error) ends up
/// as a failed [`ResolutionResult`]; `process` itself never errors.
pub struct EntryProcessor {
    downloader: Downloader,
    search: SearchClient,
    output_dir: PathBuf,
    progress: Arc<dyn ProgressSink>,
}

impl EntryProcessor {
    #[must_use]
    pub fn new(
        downloader: Downloader,
        search: SearchClient,
        output_dir: impl Into<PathBuf>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            downloader,
            search,
            output_dir: output_dir.into(),
            progress,
        }
    }

    pub(crate) fn progress(&self) -> Arc<dyn ProgressSink> {
        Arc::clone(&self.progress)
    }

    /// Processes `entry` into `<sanitized title>.pdf`.
    pub async fn process(&self, entry: &BibEntry) -> ResolutionResult {
        self.process_as(entry, &default_file_name(entry.title())).await
    }

    /// Processes `entry` into `file_name` under the output directory.
    ///
    /// An existing file counts as success with no network call. Otherwise the
    /// entry's own link is tried first, then the search fallback.
    #[instrument(skip(self, entry), fields(key = entry.key()))]
    pub async fn process_as(&self, entry: &BibEntry, file_name: &str) -> ResolutionResult {
        let label = sanitize(entry.title());
        let dest = self.output_dir.join(file_name);

        if file_exists(&dest).await {
            debug!(path = %dest.display(), "destination exists, skipping");
            self.progress.emit(ProgressEvent::Skipped { label });
            return ResolutionResult::skipped(entry);
        }

        let (url, source) = match resolve_direct(entry) {
            Some(url) => (url, ResolutionSource::BibTeX),
            None => {
                self.progress.emit(ProgressEvent::Searching {
                    label: label.clone(),
                });
                match self.search.search_for_pdf(entry.title()).await {
                    Ok(url) => (url, ResolutionSource::Search),
                    Err(err) => {
                        let reason = err.to_string();
                        self.progress.emit(ProgressEvent::NotFound {
                            label,
                            reason: reason.clone(),
                        });
                        return ResolutionResult::failed(
                            entry,
                            ResolutionSource::Search,
                            None,
                            reason,
                        );
                    }
                }
            }
        };

        self.progress.emit(ProgressEvent::Downloading {
            label: label.clone(),
            source,
        });
        match self.downloader.download(Some(&url), &dest).await {
            Ok(_) => {
                self.progress.emit(ProgressEvent::Succeeded { label });
                ResolutionResult::succeeded(entry, url, source)
            }
            Err(err) => {
                let reason = err.to_string();
                self.progress.emit(ProgressEvent::Failed {
                    label,
                    reason: reason.clone(),
                });
                ResolutionResult::failed(entry, source, Some(url), reason)
            }
        }
    }
}

impl std::fmt::Debug for EntryProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryProcessor")
            .field("downloader", &self.downloader)
            .field("search", &self.search)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

/// What a run would do for an entry, computed without network access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    /// Destination already exists.
    Skip,
    /// Download from the entry's own link.
    Download { url: String },
    /// No direct link; the search fallback would run.
    Search,
}

/// Plans `entry` against `output_dir` without touching the network.
#[must_use]
pub fn plan_entry(output_dir: &Path, entry: &BibEntry, file_name: &str) -> PlannedAction {
    if output_dir.join(file_name).exists() {
        return PlannedAction::Skip;
    }
    match resolve_direct(entry) {
        Some(url) => PlannedAction::Download { url },
        None => PlannedAction::Search,
    }
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
