//! Bounded concurrent fan-out of entry processing.
//!
//! # Example
//!
//! ```no_run
//! use bibfetch_core::{
//!     Config, Dispatcher, Downloader, EntryProcessor, SearchClient, TracingProgress,
//!     parse_bibliography,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let processor = EntryProcessor::new(
//!     Downloader::new(&config.download)?,
//!     SearchClient::from_config(&config.search)?,
//!     &config.run.output_dir,
//!     Arc::new(TracingProgress),
//! );
//! let entries = parse_bibliography("@article{k, title={T}, eprint={arXiv:1706.03762}}").entries;
//! let results = Dispatcher::new(5)?.run_all(Arc::new(processor), entries).await?;
//! println!("{} results", results.len());
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use super::processor::EntryProcessor;
use super::result::{DOI_PLACEHOLDER, ResolutionResult};
use crate::bibliography::BibEntry;
use crate::filename::{FileNamePlan, sanitize};
use crate::progress::{ProgressEvent, ProgressSink};

/// Minimum allowed parallelism.
const MIN_PARALLEL: usize = 1;

/// Maximum allowed parallelism.
const MAX_PARALLEL: usize = 100;

/// Default number of entries processed at once.
pub const DEFAULT_MAX_PARALLEL: usize = 5;

/// Error type for dispatcher operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    /// Invalid parallelism value provided.
    #[error("invalid concurrency value {value}: must be between {MIN_PARALLEL} and {MAX_PARALLEL}")]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Runs entry processing with bounded parallelism.
#[derive(Debug)]
pub struct Dispatcher {
    max_parallel: usize,
    semaphore: Arc<Semaphore>,
}

impl Dispatcher {
    /// Creates a dispatcher running at most `max_parallel` entries at once.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::InvalidConcurrency`] outside `1..=100`.
    pub fn new(max_parallel: usize) -> Result<Self, DispatcherError> {
        if !(MIN_PARALLEL..=MAX_PARALLEL).contains(&max_parallel) {
            return Err(DispatcherError::InvalidConcurrency {
                value: max_parallel,
            });
        }
        Ok(Self {
            max_parallel,
            semaphore: Arc::new(Semaphore::new(max_parallel)),
        })
    }

    #[must_use]
    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Processes every entry and returns one result per entry, in completion order.
    ///
    /// Destination names come from a [`FileNamePlan`] over all titles, so two
    /// distinct titles never share a file. A panicking entry becomes a failed
    /// result with reason `internal error: ...`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::SemaphoreClosed`] if the semaphore is closed.
    /// Individual entry failures never cause this method to error.
    #[instrument(skip_all, fields(entries = entries.len(), max_parallel = self.max_parallel))]
    pub async fn run_all(
        &self,
        processor: Arc<EntryProcessor>,
        entries: Vec<BibEntry>,
    ) -> Result<Vec<ResolutionResult>, DispatcherError> {
        let progress = processor.progress();
        self.run_tasks(entries, progress, move |entry, file_name| {
            let processor = Arc::clone(&processor);
            async move { processor.process_as(&entry, &file_name).await }
        })
        .await
    }

    pub(crate) async fn run_tasks<F, Fut>(
        &self,
        entries: Vec<BibEntry>,
        progress: Arc<dyn ProgressSink>,
        task: F,
    ) -> Result<Vec<ResolutionResult>, DispatcherError>
    where
        F: Fn(BibEntry, String) -> Fut,
        Fut: Future<Output = ResolutionResult> + Send + 'static,
    {
        let plan = FileNamePlan::new(entries.iter().map(BibEntry::title));
        let total = entries.len();
        let mut tasks = JoinSet::new();

        info!(total, "dispatching entries");

        for entry in entries {
            // Acquire before spawning so at most `max_parallel` tasks exist at once.
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| DispatcherError::SemaphoreClosed)?;

            let file_name = plan.file_name(entry.title());
            let title = entry.title().to_string();
            let doi = entry.doi().unwrap_or(DOI_PLACEHOLDER).to_string();
            let progress = Arc::clone(&progress);
            let work = task(entry, file_name);

            tasks.spawn(async move {
                let _permit = permit;
                match AssertUnwindSafe(work).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        error!(title = %title, %message, "entry task panicked");
                        progress.emit(ProgressEvent::TaskPanicked {
                            label: sanitize(&title),
                            message: message.clone(),
                        });
                        ResolutionResult::internal_error(title, doi, &message)
                    }
                }
            });
        }

        debug!(task_count = tasks.len(), "waiting for entries to complete");

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                // Panics are caught inside the task; only cancellation lands here.
                Err(e) => warn!(error = %e, "entry task did not complete"),
            }
        }
        progress.finish();

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            total,
            succeeded = results.len() - failed,
            failed,
            "all entries processed"
        );
        Ok(results)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
