//! Bibliography input: BibTeX parsing into plain field maps.
//!
//! The resolution pipeline treats each entry as an opaque key-value record.
//! This module is the collaborator that turns a `.bib` file into those
//! records; it never touches the network.
//!
//! # Example
//!
//! ```
//! use bibfetch_core::bibliography::parse_bibliography;
//!
//! let parsed = parse_bibliography("@article{k, title={Attention is all you need}, year={2017}}");
//! assert_eq!(parsed.entries.len(), 1);
//! assert_eq!(parsed.entries[0].title(), "Attention is all you need");
//! ```

mod bibtex;
mod entry;
mod error;

pub use bibtex::{BibliographyParseResult, parse_bibliography};
pub use entry::{BibEntry, UNTITLED_PLACEHOLDER};
pub use error::BibliographyError;

use std::path::Path;

use tracing::{debug, instrument};

/// Reads and parses a bibliography file.
///
/// # Errors
///
/// Returns [`BibliographyError::Read`] when the file cannot be read as UTF-8
/// text. Malformed entries are not errors; they are reported in
/// [`BibliographyParseResult::skipped`].
#[instrument(fields(path = %path.display()))]
pub fn load_bibliography(path: &Path) -> Result<BibliographyParseResult, BibliographyError> {
    let raw = std::fs::read_to_string(path).map_err(|e| BibliographyError::read(path, e))?;
    let parsed = parse_bibliography(&raw);
    debug!(
        entries = parsed.entries.len(),
        skipped = parsed.skipped.len(),
        "bibliography loaded"
    );
    Ok(parsed)
}
