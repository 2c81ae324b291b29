//! Per-entry progress notifications.
//!
//! Entry tasks report each state transition as a [`ProgressEvent`] to a
//! shared [`ProgressSink`]. Sinks are called concurrently from every task and
//! must emit each event as one uninterrupted line.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::ResolutionSource;

/// Characters of the title shown when an entry starts a step.
const START_LABEL_CHARS: usize = 30;
/// Characters of the title shown on an outcome line.
const OUTCOME_LABEL_CHARS: usize = 20;

/// One transition of an entry through the pipeline.
///
/// `label` is the entry's sanitized title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Destination file already present; nothing to do.
    Skipped { label: String },
    /// No direct link; querying the search provider.
    Searching { label: String },
    /// Download started.
    Downloading {
        label: String,
        source: ResolutionSource,
    },
    /// File written.
    Succeeded { label: String },
    /// Download failed.
    Failed { label: String, reason: String },
    /// No direct link and search produced nothing usable.
    NotFound { label: String, reason: String },
    /// The entry's task panicked.
    TaskPanicked { label: String, message: String },
}

impl ProgressEvent {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Skipped { label }
            | Self::Searching { label }
            | Self::Downloading { label, .. }
            | Self::Succeeded { label }
            | Self::Failed { label, .. }
            | Self::NotFound { label, .. }
            | Self::TaskPanicked { label, .. } => label,
        }
    }

    /// True for the last event an entry emits.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Searching { .. } | Self::Downloading { .. })
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = head(self.label(), START_LABEL_CHARS);
        let outcome = head(self.label(), OUTCOME_LABEL_CHARS);
        match self {
            Self::Skipped { .. } => write!(f, "[skip] already downloaded: {start}..."),
            Self::Searching { .. } => write!(f, "Searching: {start}..."),
            Self::Downloading { source, .. } => write!(f, "Downloading ({source}): {start}..."),
            Self::Succeeded { .. } => write!(f, "   -> [ok] {outcome}..."),
            Self::Failed { reason, .. } => write!(f, "   -> [failed] {outcome}... : {reason}"),
            Self::NotFound { reason, .. } => write!(f, "   -> [not found] {outcome}... ({reason})"),
            Self::TaskPanicked { message, .. } => {
                write!(f, "   -> [internal error] {outcome}... : {message}")
            }
        }
    }
}

fn head(label: &str, max_chars: usize) -> String {
    let taken: String = label.chars().take(max_chars).collect();
    taken.trim_end().to_string()
}

/// Receives progress events from concurrently running entry tasks.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);

    /// Called once after every entry has finished.
    fn finish(&self) {}
}

/// Terminal output: one line per event above a progress bar of finished entries.
///
/// The bar is drawn on stderr only when stderr is a terminal; event lines
/// always go to stdout.
#[derive(Debug)]
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_bar} {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }
}

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: ProgressEvent) {
        // suspend() holds the bar's draw lock, so lines from different tasks never interleave.
        self.bar.suspend(|| println!("{event}"));
        if event.is_terminal() {
            self.bar.inc(1);
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Forwards events to `tracing`, for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Failed { label, reason } | ProgressEvent::NotFound { label, reason } => {
                tracing::warn!(title = %label, %reason, "{event}");
            }
            ProgressEvent::TaskPanicked { label, message } => {
                tracing::error!(title = %label, %message, "{event}");
            }
            _ => tracing::info!(title = %event.label(), "{event}"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "An Extremely Long Paper Title That Keeps Going On";

    #[test]
    fn test_start_lines_truncate_to_thirty_chars() {
        let line = ProgressEvent::Searching {
            label: LONG.to_string(),
        }
        .to_string();
        assert_eq!(line, "Searching: An Extremely Long Paper Title...");

        let line = ProgressEvent::Downloading {
            label: LONG.to_string(),
            source: ResolutionSource::Search,
        }
        .to_string();
        assert_eq!(line, "Downloading (Search): An Extremely Long Paper Title...");
    }

    #[test]
    fn test_outcome_lines_truncate_to_twenty_chars() {
        let line = ProgressEvent::Failed {
            label: LONG.to_string(),
            reason: "HTTP 404".to_string(),
        }
        .to_string();
        assert_eq!(line, "   -> [failed] An Extremely Long Pa... : HTTP 404");

        let line = ProgressEvent::NotFound {
            label: "Short".to_string(),
            reason: "search found no results".to_string(),
        }
        .to_string();
        assert_eq!(line, "   -> [not found] Short... (search found no results)");
    }

    #[test]
    fn test_terminal_events() {
        let label = String::from("t");
        assert!(!ProgressEvent::Searching { label: label.clone() }.is_terminal());
        assert!(ProgressEvent::Skipped { label: label.clone() }.is_terminal());
        assert!(ProgressEvent::Succeeded { label }.is_terminal());
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingProgress::new();
        sink.emit(ProgressEvent::Searching {
            label: "a".to_string(),
        });
        sink.emit(ProgressEvent::Succeeded {
            label: "a".to_string(),
        });
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], ProgressEvent::Succeeded { .. }));
    }
}
