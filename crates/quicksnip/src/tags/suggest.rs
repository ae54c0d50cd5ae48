//! Fuzzy tag completion.
//!
//! Used by editors while the user types a tag. Matching is more lenient than
//! snippet search: a tag only needs to score [`SUGGESTION_CUTOFF`].
//!
//! ## Ranking
//! - Empty prefix: the first `limit` known tags, in the order given
//! - A tag that starts with the prefix scores 100
//! - Any other tag scores by [`crate::search::field_similarity`]
//! - Ties are broken alphabetically

use crate::search::field_similarity;

/// Minimum score for a tag to be suggested.
pub const SUGGESTION_CUTOFF: f64 = 40.0;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Suggests known tags for a partially typed one.
///
/// # Examples
/// ```
/// use quicksnip::tags::suggest_tags;
///
/// let known = vec!["python".to_string(), "powershell".to_string(), "git".to_string()];
/// assert_eq!(suggest_tags("py", &known, 10), vec!["python"]);
/// assert_eq!(suggest_tags("pyhton", &known, 10)[0], "python");
/// ```
pub fn suggest_tags(prefix: &str, known: &[String], limit: usize) -> Vec<String> {
    let needle = prefix.trim().to_lowercase();
    if needle.is_empty() {
        return known.iter().take(limit).cloned().collect();
    }

    let mut scored: Vec<(f64, &String)> = known
        .iter()
        .filter_map(|tag| {
            let lowered = tag.to_lowercase();
            let score = if lowered.starts_with(&needle) {
                100.0
            } else {
                field_similarity(&needle, &lowered)
            };
            (score >= SUGGESTION_CUTOFF).then_some((score, tag))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, tag)| tag.clone())
        .collect()
}
