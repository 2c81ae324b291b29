//! Title sanitization and destination file naming.
//!
//! [`sanitize`] maps any free-text title to a bounded, filesystem-safe name.
//! [`FileNamePlan`] assigns each entry of a run its destination file name and
//! disambiguates distinct titles that sanitize to the same name.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::bibliography::UNTITLED_PLACEHOLDER;

/// Maximum length of a sanitized title, in characters.
pub const MAX_SANITIZED_LEN: usize = 150;

/// File extension appended to every destination name.
pub const PDF_EXTENSION: &str = ".pdf";

const HASH_SUFFIX_HEX_LEN: usize = 8;

#[allow(clippy::expect_used)]
static FORBIDDEN_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("forbidden filename regex is valid"));

/// Maps a title to a safe file name stem.
///
/// Strips `\ / * ? : " < > |`, collapses all whitespace runs to single
/// spaces, trims, and truncates to [`MAX_SANITIZED_LEN`] characters.
/// Total and idempotent.
#[must_use]
pub fn sanitize(title: &str) -> String {
    let stripped = FORBIDDEN_CHARS.replace_all(title, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    // Truncation can leave a trailing space; trim again so sanitize stays idempotent.
    collapsed
        .chars()
        .take(MAX_SANITIZED_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Destination names for one run, keyed by full title.
#[derive(Debug, Clone, Default)]
pub struct FileNamePlan {
    names: HashMap<String, String>,
}

impl FileNamePlan {
    /// Builds a plan for the given titles.
    ///
    /// A title whose sanitized stem is unique maps to `<stem>.pdf`. When two
    /// or more distinct titles share a stem, each of them maps to
    /// `<stem> [<hash8>].pdf`, where `hash8` comes from the SHA-256 of the
    /// full title. Identical titles share one name.
    #[must_use]
    pub fn new<'a, I>(titles: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_stem: HashMap<String, Vec<&'a str>> = HashMap::new();
        for title in titles {
            let group = by_stem.entry(stem_for(title)).or_default();
            if !group.contains(&title) {
                group.push(title);
            }
        }

        let mut names = HashMap::new();
        for (stem, group) in by_stem {
            if group.len() == 1 {
                names.insert(group[0].to_string(), format!("{stem}{PDF_EXTENSION}"));
                continue;
            }
            tracing::debug!(stem = %stem, titles = group.len(), "disambiguating colliding file names");
            for title in group {
                names.insert(
                    title.to_string(),
                    format!("{stem} [{}]{PDF_EXTENSION}", short_hash(title)),
                );
            }
        }
        Self { names }
    }

    /// Destination file name for `title`, falling back to `<sanitize(title)>.pdf`
    /// for titles the plan was not built with.
    #[must_use]
    pub fn file_name(&self, title: &str) -> String {
        self.names
            .get(title)
            .cloned()
            .unwrap_or_else(|| default_file_name(title))
    }
}

/// `<sanitize(title)>.pdf`.
#[must_use]
pub fn default_file_name(title: &str) -> String {
    format!("{}{PDF_EXTENSION}", stem_for(title))
}

/// Sanitized stem, never empty so the file is not a bare `.pdf`.
fn stem_for(title: &str) -> String {
    let stem = sanitize(title);
    if stem.is_empty() {
        UNTITLED_PLACEHOLDER.to_string()
    } else {
        stem
    }
}

fn short_hash(title: &str) -> String {
    Sha256::digest(title.as_bytes())
        .iter()
        .take(HASH_SUFFIX_HEX_LEN / 2)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
