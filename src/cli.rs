//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use bibfetch_core::{Config, ContentTypePolicy};
use clap::Parser;

/// Download the PDFs cited in a BibTeX bibliography.
///
/// Each entry is fetched from its own `url`/`eprint` when possible, otherwise
/// located through a web search restricted to PDF results. Entries that could
/// not be retrieved are listed in a failure report with a manual DOI link.
#[derive(Parser, Debug)]
#[command(name = "bibfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Bibliography file [default: references.bib, or run.bibliography from config]
    #[arg(value_name = "BIB_FILE")]
    pub bib_file: Option<PathBuf>,

    /// Directory receiving the PDFs [default: downloaded_papers]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Failure report path [default: download_report.txt]
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Entries processed in parallel (1-100) [default: 5]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Per-request timeout in seconds for search and download (1-3600) [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Config file [default: $XDG_CONFIG_HOME/bibfetch/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only accept PDF or octet-stream responses
    #[arg(long)]
    pub strict_content_type: bool,

    /// Show what would be done without network access or writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output; only errors are logged
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Applies explicit flags on top of file and environment configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = &self.bib_file {
            config.run.bibliography.clone_from(path);
        }
        if let Some(dir) = &self.output_dir {
            config.run.output_dir.clone_from(dir);
        }
        if let Some(report) = &self.report {
            config.run.report_path.clone_from(report);
        }
        if let Some(concurrency) = self.concurrency {
            config.run.max_parallel = usize::from(concurrency);
        }
        if let Some(timeout) = self.timeout {
            config.search.timeout_secs = timeout;
            config.download.timeout_secs = timeout;
        }
        if self.strict_content_type {
            config.download.content_type_policy = ContentTypePolicy::Strict;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["bibfetch"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.dry_run);
        assert!(args.bib_file.is_none());
        assert!(args.concurrency.is_none());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["bibfetch", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["bibfetch", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["bibfetch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["bibfetch", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["bibfetch", "-c", "100"]).unwrap();
        assert_eq!(args.concurrency, Some(100));

        let err = Args::try_parse_from(["bibfetch", "-c", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let err = Args::try_parse_from(["bibfetch", "--concurrency", "101"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_timeout_zero_rejected() {
        let err = Args::try_parse_from(["bibfetch", "--timeout", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "bibfetch",
            "refs.bib",
            "-o",
            "pdfs",
            "--report",
            "failures.txt",
            "-c",
            "8",
            "--timeout",
            "12",
            "--strict-content-type",
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.run.bibliography, PathBuf::from("refs.bib"));
        assert_eq!(config.run.output_dir, PathBuf::from("pdfs"));
        assert_eq!(config.run.report_path, PathBuf::from("failures.txt"));
        assert_eq!(config.run.max_parallel, 8);
        assert_eq!(config.search.timeout_secs, 12);
        assert_eq!(config.download.timeout_secs, 12);
        assert_eq!(config.download.content_type_policy, ContentTypePolicy::Strict);
    }

    #[test]
    fn test_absent_flags_leave_config_untouched() {
        let args = Args::try_parse_from(["bibfetch"]).unwrap();
        let mut config = Config::from_toml_str("[run]\nmax_parallel = 9\n").unwrap();
        args.apply_to(&mut config);
        assert_eq!(config.run.max_parallel, 9);
        assert_eq!(config.download.content_type_policy, ContentTypePolicy::Permissive);
    }
}
