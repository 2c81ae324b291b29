//! Bibfetch Core Library
//!
//! This library resolves bibliography entries to downloadable PDF files. Each
//! entry is resolved from its own fields first (URL, arXiv eprint), then via a
//! web search constrained to PDF results, and the resulting link is streamed to
//! disk behind a content-type gate that catches paywall/login pages.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`bibliography`] - BibTeX parsing into plain field maps
//! - [`filename`] - Title sanitization and destination naming
//! - [`resolver`] - Direct URL derivation from bibliographic fields
//! - [`search`] - Search fallback with a swappable provider
//! - [`download`] - Streaming downloader with content-type validation
//! - [`pipeline`] - Per-entry processing and the bounded concurrent dispatcher
//! - [`progress`] - Serialized progress sinks shared by concurrent tasks
//! - [`report`] - Run summary and failure report
//! - [`config`] - Layered configuration (defaults, TOML file, environment)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bibliography;
pub mod config;
pub mod download;
pub mod filename;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod resolver;
pub mod search;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use bibliography::{
    BibEntry, BibliographyError, BibliographyParseResult, load_bibliography, parse_bibliography,
};
pub use config::{Config, ConfigError, ContentTypePolicy, DownloadConfig, RunConfig, SearchConfig};
pub use download::{DownloadError, Downloader};
pub use filename::{FileNamePlan, sanitize};
pub use pipeline::{
    DEFAULT_MAX_PARALLEL, Dispatcher, DispatcherError, EntryProcessor, PlannedAction,
    ResolutionResult, ResolutionSource, plan_entry,
};
pub use progress::{
    ConsoleProgress, ProgressEvent, ProgressSink, RecordingProgress, TracingProgress,
};
pub use report::{FailureReport, RunSummary};
pub use resolver::resolve_direct;
pub use search::{GoogleSearchProvider, SearchClient, SearchError, SearchProvider};
