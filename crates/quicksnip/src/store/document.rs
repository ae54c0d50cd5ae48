//! # Snippet File Format
//!
//! ```yaml
//! version: 1
//! snippets:
//!   - id: git-uncommit
//!     name: Undo last commit (keep changes)
//!     description: Git command to undo last commit but keep changes
//!     content: git reset --soft HEAD~1
//!     tags: [git, version-control]
//!     created: 2025-11-04T09:30:00Z
//!     modified: 2025-11-04T09:30:00Z
//! ```
//!
//! Decoding is lenient per entry and strict for the document:
//!
//! - The document must be a mapping with a `snippets` sequence (an empty
//!   `snippets:` counts as an empty list). Anything else is `StorageCorrupt`.
//! - An entry without a non-blank `id` or `name` is skipped (`EntryInvalid`).
//! - Scalars are accepted where strings are expected (`id: 42`).
//! - `tags` may be a list or a comma-separated string and is normalized.
//! - Missing or unreadable timestamps become the load time.
//! - Duplicate ids are repaired with the first free `-N` suffix.

use crate::error::{QuicksnipError, Result};
use crate::model::{self, Snippet};
use crate::tags::{normalize_tags, parse_tag_list};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::HashSet;

pub const FORMAT_VERSION: u64 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u64,
    snippets: &'a [Snippet],
}

/// Result of decoding a document that parsed as a whole.
#[derive(Debug, Default)]
pub struct Decoded {
    pub snippets: Vec<Snippet>,
    /// One message per skipped entry.
    pub invalid: Vec<String>,
    /// `(original, assigned)` for every duplicate id that was renamed.
    pub renamed: Vec<(String, String)>,
}

pub fn encode(snippets: &[Snippet]) -> Result<String> {
    Ok(serde_yaml::to_string(&DocumentRef {
        version: FORMAT_VERSION,
        snippets,
    })?)
}

pub fn decode(text: &str) -> Result<Decoded> {
    let root: Value =
        serde_yaml::from_str(text).map_err(|e| QuicksnipError::StorageCorrupt(e.to_string()))?;

    let Value::Mapping(mapping) = root else {
        return Err(QuicksnipError::StorageCorrupt(
            "document is not a mapping".to_string(),
        ));
    };

    if let Some(version) = mapping.get("version").and_then(Value::as_u64) {
        if version != FORMAT_VERSION {
            tracing::warn!(version, "unknown snippet file version, reading as version 1");
        }
    }

    let entries: &[Value] = match mapping.get("snippets") {
        Some(Value::Sequence(entries)) => entries.as_slice(),
        Some(Value::Null) => &[],
        Some(_) => {
            return Err(QuicksnipError::StorageCorrupt(
                "'snippets' is not a list".to_string(),
            ))
        }
        None => {
            return Err(QuicksnipError::StorageCorrupt(
                "missing 'snippets' list".to_string(),
            ))
        }
    };

    let now = model::now();
    let mut decoded = Decoded::default();
    let mut taken = HashSet::new();

    for (position, entry) in entries.iter().enumerate() {
        match parse_entry(entry, now) {
            Ok(mut snippet) => {
                if taken.contains(&snippet.id) {
                    let original = snippet.id.clone();
                    snippet.id = claim_id(&original, &mut taken);
                    decoded.renamed.push((original, snippet.id.clone()));
                } else {
                    taken.insert(snippet.id.clone());
                }
                decoded.snippets.push(snippet);
            }
            Err(e) => decoded.invalid.push(format!("entry {}: {}", position + 1, e)),
        }
    }

    Ok(decoded)
}

/// Claims `base`, or the first free `base-N`, in `taken`.
pub(crate) fn claim_id(base: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{}-{}", base, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn parse_entry(entry: &Value, now: DateTime<Utc>) -> Result<Snippet> {
    let Value::Mapping(fields) = entry else {
        return Err(QuicksnipError::EntryInvalid("not a mapping".to_string()));
    };

    let id = scalar(fields.get("id")).map(|s| s.trim().to_string()).unwrap_or_default();
    if id.is_empty() {
        return Err(QuicksnipError::EntryInvalid("missing 'id'".to_string()));
    }
    let name = scalar(fields.get("name")).unwrap_or_default();
    if name.trim().is_empty() {
        return Err(QuicksnipError::EntryInvalid(format!("'{}' has no 'name'", id)));
    }

    Ok(Snippet {
        id,
        name,
        description: scalar(fields.get("description")).unwrap_or_default(),
        content: scalar(fields.get("content")).unwrap_or_default(),
        tags: tags(fields.get("tags")),
        created: timestamp(fields.get("created")).unwrap_or(now),
        modified: timestamp(fields.get("modified")).unwrap_or(now),
    })
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => {
            normalize_tags(items.iter().filter_map(|item| scalar(Some(item))))
        }
        Some(Value::String(list)) => parse_tag_list(list),
        _ => Vec::new(),
    }
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    scalar(value).and_then(|raw| model::parse_timestamp(&raw))
}
