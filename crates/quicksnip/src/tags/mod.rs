//! Tag support for quicksnip.
//!
//! Tags are free-form labels on a snippet. Unlike names they are normalized
//! before they are stored, so `"Version Control"`, `"version control"` and
//! `"version-control"` all end up as the same tag.
//!
//! ## Normalization Rules
//!
//! - Leading/trailing whitespace is dropped
//! - Letters are lowercased
//! - Each run of internal whitespace becomes a single hyphen
//! - Blank tags are discarded
//! - Duplicates are removed, keeping the first occurrence
//!
//! Normalization is idempotent: normalizing a normalized list returns it unchanged.
//!
//! See [`suggest`] for fuzzy tag completion.

pub mod suggest;

use crate::model::Snippet;
use std::collections::{BTreeSet, HashSet};

pub use suggest::{suggest_tags, DEFAULT_SUGGESTION_LIMIT, SUGGESTION_CUTOFF};

/// Normalizes a single tag, returning `None` when nothing is left.
///
/// # Examples
/// ```
/// use quicksnip::tags::normalize_tag;
///
/// assert_eq!(normalize_tag("  Code Review "), Some("code-review".to_string()));
/// assert_eq!(normalize_tag("python"), Some("python".to_string()));
/// assert_eq!(normalize_tag("   "), None);
/// ```
pub fn normalize_tag(raw: &str) -> Option<String> {
    let joined = raw
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Normalizes a list of tags and drops duplicates, preserving first occurrence.
pub fn normalize_tags<I, T>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Splits comma-separated user input (`"python, code review"`) into normalized tags.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

/// Every distinct tag in use, sorted.
pub fn collect_tags(snippets: &[Snippet]) -> Vec<String> {
    snippets
        .iter()
        .flat_map(|s| s.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
