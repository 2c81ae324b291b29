//! The bibliography record consumed by the resolution pipeline.

use std::collections::BTreeMap;

/// Title used when an entry carries no `title` field.
pub const UNTITLED_PLACEHOLDER: &str = "Untitled_Paper";

/// One bibliography entry: citation key, entry type, and its fields.
///
/// Field names are stored lowercase. Accessors treat blank values as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BibEntry {
    key: String,
    entry_type: String,
    fields: BTreeMap<String, String>,
}

impl BibEntry {
    /// Creates an entry with no fields.
    #[must_use]
    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builds an entry from `(name, value)` pairs. First value wins on duplicates.
    #[must_use]
    pub fn from_fields<I, K, V>(key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entry = Self::new(key, "misc");
        for (name, value) in fields {
            entry.insert_field(name, value);
        }
        entry
    }

    /// Adds a field (builder style).
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_field(name, value);
        self
    }

    pub(crate) fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .entry(name.into().to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Citation key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lowercase entry type (`article`, `misc`, ...).
    #[must_use]
    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    /// Returns a trimmed, non-empty field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Title, or [`UNTITLED_PLACEHOLDER`] when missing.
    #[must_use]
    pub fn title(&self) -> &str {
        self.field("title").unwrap_or(UNTITLED_PLACEHOLDER)
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.field("url")
    }

    #[must_use]
    pub fn eprint(&self) -> Option<&str> {
        self.field("eprint")
    }

    #[must_use]
    pub fn archive_prefix(&self) -> Option<&str> {
        self.field("archiveprefix")
    }

    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.field("doi")
    }
}
