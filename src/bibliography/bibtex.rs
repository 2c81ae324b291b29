//! BibTeX parsing into [`BibEntry`] records.

use super::entry::BibEntry;

const IGNORED_BLOCK_TYPES: [&str; 3] = ["comment", "preamble", "string"];

/// Batch parse result for BibTeX input.
#[derive(Debug, Clone, Default)]
pub struct BibliographyParseResult {
    /// Parsed entries in input order.
    pub entries: Vec<BibEntry>,
    /// Actionable skip messages for malformed blocks.
    pub skipped: Vec<String>,
    /// Total `@...{...}` segments discovered, including ignored and malformed ones.
    pub total_found: usize,
}

impl BibliographyParseResult {
    /// Returns true when no entry could be parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses BibTeX entries from input text.
///
/// `@comment`, `@preamble` and `@string` blocks are ignored. Every other entry
/// type is accepted. Malformed entries are skipped with a message and never
/// swallow the entry that follows them.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn parse_bibliography(input: &str) -> BibliographyParseResult {
    let mut result = BibliographyParseResult::default();
    let segments = segment_entries(input);
    result.total_found = segments.len();

    for raw_entry in &segments {
        match parse_entry(raw_entry) {
            EntryOutcome::Parsed(entry) => result.entries.push(entry),
            EntryOutcome::Ignore => {}
            EntryOutcome::Skip(message) => result.skipped.push(message),
        }
    }

    result
}

#[derive(Debug)]
enum EntryOutcome {
    Parsed(BibEntry),
    Ignore,
    Skip(String),
}

fn segment_entries(input: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut segments = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i].1 != '@' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_ascii_alphabetic() {
            j += 1;
        }
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        if j >= chars.len() || chars[j].1 != '{' {
            i += 1;
            continue;
        }

        let start = chars[i].0;
        match find_closing_brace(&chars, j) {
            Some(end_index) => {
                let end_exclusive = chars.get(end_index + 1).map_or(input.len(), |c| c.0);
                segments.push(input[start..end_exclusive].trim().to_string());
                i = end_index + 1;
            }
            None => {
                // Unbalanced entry: stop at the next `@` that starts a line.
                let recovery = (i + 1..chars.len())
                    .find(|&k| chars[k].1 == '@' && matches!(chars[k - 1].1, '\n' | '\r'));
                if let Some(next) = recovery {
                    segments.push(input[start..chars[next].0].trim().to_string());
                    i = next;
                } else {
                    segments.push(input[start..].trim().to_string());
                    break;
                }
            }
        }
    }

    segments
}

/// Returns the index of the brace closing the one at `open`.
fn find_closing_brace(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escape = false;

    for (k, (_, ch)) in chars.iter().enumerate().skip(open) {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            // Quotes only delimit values at the entry's top level.
            '"' if depth == 1 => in_quotes = !in_quotes,
            '{' if !in_quotes => depth += 1,
            '}' if !in_quotes => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(k);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_entry(raw_entry: &str) -> EntryOutcome {
    let trimmed = raw_entry.trim();
    let Some(after_at) = trimmed.strip_prefix('@') else {
        return EntryOutcome::Skip(
            "malformed BibTeX entry: missing '@type{...}' prefix".to_string(),
        );
    };
    let Some(brace_pos) = after_at.find('{') else {
        return EntryOutcome::Skip(format!(
            "malformed BibTeX entry `{}`: missing opening '{{' after entry type",
            preview(trimmed)
        ));
    };

    let entry_type = after_at[..brace_pos].trim().to_ascii_lowercase();
    if IGNORED_BLOCK_TYPES.contains(&entry_type.as_str()) {
        return EntryOutcome::Ignore;
    }
    if !trimmed.ends_with('}') {
        return EntryOutcome::Skip(format!(
            "malformed BibTeX entry `{}`: unbalanced braces (entry never closed)",
            preview(trimmed)
        ));
    }

    let body = &after_at[brace_pos + 1..after_at.len() - 1];
    let Some((key_raw, fields_raw)) = body.split_once(',') else {
        return EntryOutcome::Skip(format!(
            "malformed BibTeX entry `{}`: missing citation key or field list",
            preview(trimmed)
        ));
    };
    let key = key_raw.trim();
    if key.is_empty() {
        return EntryOutcome::Skip(format!(
            "malformed BibTeX entry `{}`: empty citation key",
            preview(trimmed)
        ));
    }

    let pairs = match split_fields(fields_raw) {
        Ok(pairs) => pairs,
        Err(reason) => {
            return EntryOutcome::Skip(format!(
                "malformed BibTeX entry `{key}`: {reason}"
            ));
        }
    };

    let mut entry = BibEntry::new(key, entry_type);
    for (name, value) in pairs {
        entry.insert_field(name, value);
    }
    EntryOutcome::Parsed(entry)
}

/// Splits `name = value, ...` at top-level commas and cleans each value.
fn split_fields(input: &str) -> Result<Vec<(String, String)>, String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' if depth == 0 => in_quotes = !in_quotes,
            '{' if !in_quotes => depth += 1,
            '}' if !in_quotes => {
                depth = depth
                    .checked_sub(1)
                    .ok_or("closing brace without matching opening brace")?;
            }
            ',' if depth == 0 && !in_quotes => {
                segments.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if in_quotes {
        return Err("unterminated quoted value".to_string());
    }
    if depth != 0 {
        return Err("unbalanced braces in field values".to_string());
    }
    segments.push(current);

    let mut pairs = Vec::new();
    for segment in segments.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let Some((name, value)) = segment.split_once('=') else {
            return Err(format!("missing '=' in field `{}`", preview(segment)));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err("empty field name".to_string());
        }
        pairs.push((name.to_ascii_lowercase(), clean_value(value)));
    }
    Ok(pairs)
}

/// Removes the outer delimiters and case-protection braces, and flattens whitespace.
fn clean_value(value: &str) -> String {
    let trimmed = value.trim();
    let inner = if (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if matches!(chars.peek(), Some('{' | '}' | '"')) => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '{' | '}' => {}
            _ => out.push(ch),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn preview(input: &str) -> String {
    const MAX: usize = 80;
    if input.chars().count() <= MAX {
        return input.to_string();
    }
    let shortened: String = input.chars().take(MAX).collect();
    format!("{shortened}...")
}
