//! Layered run configuration.
//!
//! Search credentials, timeouts and run paths are explicit values passed into
//! the search client, downloader and dispatcher constructors. Layers, lowest
//! priority first: built-in defaults, an optional TOML file, environment
//! overrides, then CLI flags (applied by the binary).
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! api_key = "your-api-key"
//! engine_id = "your-search-engine-id"
//! num_results = 3
//!
//! [download]
//! timeout_secs = 30
//! content_type_policy = "strict"
//!
//! [run]
//! bibliography = "references.bib"
//! output_dir = "downloaded_papers"
//! report_path = "download_report.txt"
//! max_parallel = 5
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::pipeline::DEFAULT_MAX_PARALLEL;
use crate::user_agent;

/// Default search endpoint (Google Custom Search JSON API).
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Default number of search results inspected per query.
pub const DEFAULT_NUM_RESULTS: u8 = 3;

/// Default per-request timeout for search and download calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding `search.api_key`.
pub const ENV_SEARCH_API_KEY: &str = "BIBFETCH_SEARCH_API_KEY";

/// Environment variable overriding `search.engine_id`.
pub const ENV_SEARCH_ENGINE_ID: &str = "BIBFETCH_SEARCH_ENGINE_ID";

const MAX_PARALLEL_RANGE: std::ops::RangeInclusive<usize> = 1..=100;
const NUM_RESULTS_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config{}: {source}", .path.as_ref().map(|p| format!(" file {}", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    /// A value is outside its accepted range.
    #[error("invalid config value for `{field}`: {value}. Expected range: {expected}")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// How the downloader treats non-PDF content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypePolicy {
    /// Reject HTML pages; let every other content type through.
    #[default]
    Permissive,
    /// Accept only PDF, octet-stream, or a missing Content-Type.
    Strict,
}

/// Search fallback settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// API key for the search endpoint.
    pub api_key: Option<String>,
    /// Search engine identifier (`cx`).
    pub engine_id: Option<String>,
    /// Search endpoint URL.
    pub endpoint: String,
    /// Results requested per query (1..=10).
    pub num_results: u8,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SearchConfig {
    /// Returns `(api_key, engine_id)` when both are set and not placeholders.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_deref().filter(|v| !is_placeholder(v))?;
        let cx = self.engine_id.as_deref().filter(|v| !is_placeholder(v))?;
        Some((key.trim(), cx.trim()))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Downloader settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with downloads.
    pub user_agent: String,
    /// Content-type gate policy.
    pub content_type_policy: ContentTypePolicy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: user_agent::BROWSER_USER_AGENT.to_string(),
            content_type_policy: ContentTypePolicy::default(),
        }
    }
}

impl DownloadConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Paths and parallelism for one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Bibliography file to read.
    pub bibliography: PathBuf,
    /// Directory receiving one PDF per resolved entry.
    pub output_dir: PathBuf,
    /// Failure report path.
    pub report_path: PathBuf,
    /// Entries processed at once (1..=100).
    pub max_parallel: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bibliography: PathBuf::from("references.bib"),
            output_dir: PathBuf::from("downloaded_papers"),
            report_path: PathBuf::from("download_report.txt"),
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub search: SearchConfig,
    pub download: DownloadConfig,
    pub run: RunConfig,
}

impl Config {
    /// Parses a TOML document. Missing sections and keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Loads `explicit` when given, otherwise the default config path if it
    /// exists, otherwise built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a file exists but cannot be read or parsed.
    /// An explicit path that does not exist is a read error.
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match resolve_default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Applies `BIBFETCH_SEARCH_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| env::var(name).ok());
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty(ENV_SEARCH_API_KEY) {
            self.search.api_key = Some(key);
        }
        if let Some(cx) = non_empty(ENV_SEARCH_ENGINE_ID) {
            self.search.engine_id = Some(cx);
        }
    }

    /// Validates ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !MAX_PARALLEL_RANGE.contains(&self.run.max_parallel) {
            return Err(invalid("run.max_parallel", self.run.max_parallel, "1..=100"));
        }
        if !NUM_RESULTS_RANGE.contains(&self.search.num_results) {
            return Err(invalid("search.num_results", self.search.num_results, "1..=10"));
        }
        if !TIMEOUT_RANGE.contains(&self.search.timeout_secs) {
            return Err(invalid("search.timeout_secs", self.search.timeout_secs, "1..=3600"));
        }
        if !TIMEOUT_RANGE.contains(&self.download.timeout_secs) {
            return Err(invalid(
                "download.timeout_secs",
                self.download.timeout_secs,
                "1..=3600",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: impl ToString, expected: &'static str) -> ConfigError {
    ConfigError::Invalid {
        field,
        value: value.to_string(),
        expected,
    }
}

/// True for empty values and template placeholders like `YOUR_API_KEY_HERE`.
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.to_ascii_uppercase().contains("YOUR_")
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/bibfetch/config.toml`
/// 2. `$HOME/.config/bibfetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("bibfetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("bibfetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}
