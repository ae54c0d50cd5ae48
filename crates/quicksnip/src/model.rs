//! # Domain Model: Snippets
//!
//! A [`Snippet`] is a named, tagged fragment of text. Its `content` may embed
//! placeholders (see [`crate::variables`]) that get filled in before delivery.
//!
//! ## Identity
//!
//! - `id` is an opaque string, unique across the collection and never changed
//!   once assigned. Callers may supply one; otherwise it is derived from the
//!   name with [`slugify`] and made unique by the store.
//! - `created` / `modified` are owned by the store. Callers never set them.
//!
//! ## Timestamps on Disk
//!
//! Timestamps are written as RFC 3339 (`2025-11-04T09:30:00Z`) so they sort as
//! text. Hand-edited files frequently carry bare dates (`2025-11-04`), and
//! those are accepted on read by [`parse_timestamp`] as midnight UTC.
//!
//! ## Mutation Types
//!
//! - [`NewSnippet`]: what a caller provides to create a snippet.
//! - [`SnippetUpdate`]: a partial set of fields; `None` leaves a field as is.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    /// Normalized tags (see [`crate::tags::normalize_tags`]).
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub modified: DateTime<Utc>,
}

impl Snippet {
    /// Both `id` and `name` must be non-blank; content may be empty.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// Tags joined by a single space, the form the search engine scores.
    pub fn joined_tags(&self) -> String {
        self.tags.join(" ")
    }
}

/// Fields supplied by a caller when creating a snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSnippet {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NewSnippet {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl SnippetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.tags.is_none()
    }
}

/// Derives an id candidate from a display name.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a single
/// `-`, and trims leading/trailing hyphens. Returns an empty string when the
/// name has no alphanumeric characters at all.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Parses the timestamp forms accepted in snippet files.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` (taken as UTC)
/// and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The current time at the precision the snippet file keeps (whole seconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}
