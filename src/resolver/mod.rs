//! Direct URL resolution from bibliographic fields.
//!
//! [`resolve_direct`] derives a fetchable URL from an entry without any
//! network I/O. Known repository links are normalized to their PDF form;
//! anything else in the `url` field is passed through for the downloader to
//! validate.
//!
//! # Example
//!
//! ```
//! use bibfetch_core::{BibEntry, resolve_direct};
//!
//! let entry = BibEntry::from_fields("k", [("url", "https://arxiv.org/abs/1706.03762")]);
//! assert_eq!(
//!     resolve_direct(&entry).as_deref(),
//!     Some("https://arxiv.org/pdf/1706.03762.pdf")
//! );
//! ```

pub(crate) mod arxiv;
mod direct;
mod utils;

pub use direct::resolve_direct;
