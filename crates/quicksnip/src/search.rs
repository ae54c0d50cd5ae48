//! # Search Engine
//!
//! Ranks snippets against a free-text query. The engine is a pure function of
//! its inputs (collection, query, usage counts) so it can be re-run on every
//! keystroke without caching.
//!
//! ## Empty Query
//!
//! A blank query is not a filter. Every snippet is returned, most used first,
//! then alphabetically by name. No threshold or result limit applies.
//!
//! ## Scoring
//!
//! Each snippet is scored against four fields, each on a 0-100 scale:
//!
//! | Field | Weight |
//! |-------|--------|
//! | name | 3 |
//! | description | 2 |
//! | tags (joined with spaces) | 2 |
//! | content | 1 |
//!
//! The composite score is the weighted average over the non-empty fields, so a
//! snippet without a description is not penalized for it. Snippets whose
//! composite falls below the threshold are dropped. The rest are ordered by
//! score, then usage count, then name, then id, and truncated to `max_results`.
//!
//! ## Field Similarity
//!
//! [`field_similarity`] is case-insensitive and typo tolerant:
//! - A literal substring match scores 100
//! - Otherwise the query is compared against every run of consecutive words in
//!   the field with the same word count as the query, using normalized
//!   optimal-string-alignment distance (Levenshtein plus adjacent
//!   transpositions, so `flsk` finds `flask` and `pythno` finds `python`).
//!   The best window wins.
//!
//! The query is lowercased and split once per search. A window whose length
//! alone caps its similarity at or below the best seen so far is skipped
//! without computing the distance.

use crate::config::QuicksnipConfig;
use crate::model::Snippet;
use crate::usage::UsageLookup;
use serde::Serialize;
use std::cmp::Ordering;

pub const WEIGHT_NAME: f64 = 3.0;
pub const WEIGHT_DESCRIPTION: f64 = 2.0;
pub const WEIGHT_TAGS: f64 = 2.0;
pub const WEIGHT_CONTENT: f64 = 1.0;

/// A ranked result borrowing from the searched collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub snippet: &'a Snippet,
    /// Composite score, 0-100. Always 0 for blank queries.
    pub score: f64,
    pub uses: u64,
}

/// An owned [`SearchHit`], as handed out by the API facade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSnippet {
    pub snippet: Snippet,
    pub score: f64,
    pub uses: u64,
}

impl SearchHit<'_> {
    pub fn to_ranked(&self) -> RankedSnippet {
        RankedSnippet {
            snippet: self.snippet.clone(),
            score: self.score,
            uses: self.uses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchEngine {
    threshold: f64,
    max_results: usize,
}

impl SearchEngine {
    pub fn new(threshold: u8, max_results: usize) -> Self {
        Self {
            threshold: f64::from(threshold.min(100)),
            max_results,
        }
    }

    pub fn from_config(config: &QuicksnipConfig) -> Self {
        Self::new(config.fuzzy_threshold, config.max_results)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn search<'a, U>(&self, snippets: &'a [Snippet], query: &str, usage: &U) -> Vec<SearchHit<'a>>
    where
        U: UsageLookup + ?Sized,
    {
        let query = query.trim().to_lowercase();

        if query.is_empty() {
            let mut hits: Vec<SearchHit<'a>> = snippets
                .iter()
                .map(|snippet| SearchHit {
                    snippet,
                    score: 0.0,
                    uses: usage.count(&snippet.id),
                })
                .collect();
            hits.sort_by(compare_by_usage);
            return hits;
        }

        let needle = Needle::new(&query);
        let mut hits: Vec<SearchHit<'a>> = snippets
            .iter()
            .filter_map(|snippet| {
                let score = needle.composite(snippet);
                (score >= self.threshold).then(|| SearchHit {
                    snippet,
                    score,
                    uses: usage.count(&snippet.id),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| compare_by_usage(a, b)));
        hits.truncate(self.max_results);
        hits
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::from_config(&QuicksnipConfig::default())
    }
}

fn compare_by_usage(a: &SearchHit<'_>, b: &SearchHit<'_>) -> Ordering {
    b.uses
        .cmp(&a.uses)
        .then_with(|| a.snippet.name.to_lowercase().cmp(&b.snippet.name.to_lowercase()))
        .then_with(|| a.snippet.name.cmp(&b.snippet.name))
        .then_with(|| a.snippet.id.cmp(&b.snippet.id))
}

/// Weighted average of the per-field similarities, rounded to two decimals.
///
/// `query` must already be trimmed and lowercased.
pub fn composite_score(snippet: &Snippet, query: &str) -> f64 {
    Needle::new(query).composite(snippet)
}

/// Case-insensitive, typo-tolerant similarity of `query` within `text`, 0-100.
pub fn field_similarity(query: &str, text: &str) -> f64 {
    Needle::new(&query.trim().to_lowercase()).similarity_in(text)
}

/// A lowercased query, split into words once.
struct Needle {
    text: String,
    joined: String,
    joined_len: usize,
    span: usize,
}

impl Needle {
    fn new(query: &str) -> Self {
        let query_words: Vec<&str> = words(query).collect();
        let joined = query_words.join(" ");
        Self {
            text: query.to_string(),
            joined_len: joined.chars().count(),
            span: query_words.len(),
            joined,
        }
    }

    fn composite(&self, snippet: &Snippet) -> f64 {
        let tags = snippet.joined_tags();
        let fields = [
            (snippet.name.as_str(), WEIGHT_NAME),
            (snippet.description.as_str(), WEIGHT_DESCRIPTION),
            (tags.as_str(), WEIGHT_TAGS),
            (snippet.content.as_str(), WEIGHT_CONTENT),
        ];

        let mut total = 0.0;
        let mut weights = 0.0;
        for (text, weight) in fields {
            if text.trim().is_empty() {
                continue;
            }
            total += self.similarity_in(text) * weight;
            weights += weight;
        }

        if weights == 0.0 {
            return 0.0;
        }
        ((total / weights) * 100.0).round() / 100.0
    }

    fn similarity_in(&self, text: &str) -> f64 {
        if self.text.is_empty() || text.is_empty() {
            return 0.0;
        }

        let haystack = text.to_lowercase();
        if haystack.contains(&self.text) {
            return 100.0;
        }
        if self.span == 0 {
            return 0.0;
        }

        let text_words: Vec<&str> = words(&haystack).collect();
        if text_words.is_empty() {
            return 0.0;
        }
        if text_words.len() <= self.span {
            return similarity(&self.joined, &text_words.join(" "));
        }

        let lengths: Vec<usize> = text_words.iter().map(|w| w.chars().count()).collect();
        let mut best: f64 = 0.0;
        for (start, window) in text_words.windows(self.span).enumerate() {
            let window_len = lengths[start..start + self.span].iter().sum::<usize>() + self.span - 1;
            if length_bound(self.joined_len, window_len) <= best {
                continue;
            }
            let score = if self.span == 1 {
                similarity(&self.joined, window[0])
            } else {
                similarity(&self.joined, &window.join(" "))
            };
            best = best.max(score);
            if best >= 100.0 {
                break;
            }
        }
        best
    }
}

/// Highest similarity two strings of these lengths could reach.
fn length_bound(a: usize, b: usize) -> f64 {
    let longest = a.max(b);
    if longest == 0 {
        return 100.0;
    }
    (1.0 - a.abs_diff(b) as f64 / longest as f64) * 100.0
}

fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 100.0;
    }
    (1.0 - strsim::osa_distance(a, b) as f64 / longest as f64) * 100.0
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}
