//! HTTP downloader for streaming resolved PDF links to disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Browser User-Agent and a per-call timeout from [`DownloadConfig`](crate::DownloadConfig)
//! - Content-type gate that rejects HTML paywall/login pages before writing
//! - Partial files removed when the transfer fails midway
//!
//! # Example
//!
//! ```no_run
//! use bibfetch_core::{DownloadConfig, Downloader};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(&DownloadConfig::default())?;
//! downloader
//!     .download(Some("https://example.com/paper.pdf"), Path::new("./paper.pdf"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod content_type;
mod error;

pub use client::Downloader;
pub use error::DownloadError;
