//! Error types for bibliography loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a bibliography.
#[derive(Debug, Error)]
pub enum BibliographyError {
    /// The bibliography file could not be read.
    #[error("failed to read bibliography {path}: {source}")]
    Read {
        /// Path of the bibliography file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl BibliographyError {
    /// Creates a read error for the given path.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
