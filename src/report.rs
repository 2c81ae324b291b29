//! Run summary and the failure report file.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::info;

use crate::pipeline::ResolutionResult;

const HEADER_RULE_WIDTH: usize = 60;
const BLOCK_RULE_WIDTH: usize = 40;
const NO_URL_MARKER: &str = "none";

/// Counts over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Results produced.
    pub total: usize,
    /// Successes, including skips.
    pub succeeded: usize,
    /// Successes that were already on disk.
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_results(results: &[ResolutionResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            if result.is_success() {
                summary.succeeded += 1;
                if result.was_skipped() {
                    summary.skipped += 1;
                }
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Plain-text report of every failed entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureReport;

impl FailureReport {
    /// Writes the report for `results` to `path`, replacing any existing file.
    ///
    /// Successful results are ignored.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be written.
    pub fn write(results: &[ResolutionResult], path: &Path) -> std::io::Result<()> {
        let body = Self::render(results, Local::now());
        std::fs::write(path, body)?;
        info!(path = %path.display(), "failure report written");
        Ok(())
    }

    /// Renders the report text with `generated_at` in the header.
    #[must_use]
    pub fn render(results: &[ResolutionResult], generated_at: DateTime<Local>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Download failure report - {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "{}\n", "=".repeat(HEADER_RULE_WIDTH));

        for result in results.iter().filter(|r| !r.is_success()) {
            let _ = writeln!(out, "Title: {}", result.title());
            let _ = writeln!(out, "Reason: {}", result.reason().unwrap_or_default());
            let _ = writeln!(
                out,
                "Attempted URL: {}",
                result.url().unwrap_or(NO_URL_MARKER)
            );
            let _ = writeln!(out, "Source: {}", result.source());
            if let Some(link) = result.doi_link() {
                let _ = writeln!(out, "DOI link (manual download): {link}");
            }
            let _ = writeln!(out, "{}", "-".repeat(BLOCK_RULE_WIDTH));
        }
        out
    }
}
