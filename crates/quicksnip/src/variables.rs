//! # Placeholders
//!
//! Snippet content may embed placeholders that are filled in right before the
//! text is delivered:
//!
//! - `{{name}}`: a value is required from the caller, empty if none is given
//! - `{{name:default}}`: the default is used when the caller supplies nothing
//!
//! A name is any run of characters other than `{` and `}`, so spaces and
//! hyphens are fine (`{{short-description}}`, `{{file name}}`). The name ends at
//! the first `:` and is trimmed; everything after that colon is the default,
//! kept verbatim (`{{url:https://example.com}}` defaults to the whole URL).
//! Markers with a blank name (`{{}}`, `{{ :x}}`) are plain text.
//!
//! Extra braces around a marker are left alone: in `{{{var}}}` only the inner
//! `{{var}}` is a placeholder.
//!
//! ## Repeated Names
//!
//! Every occurrence of a name is the same variable. [`detect`] reports it once,
//! at its first position, and [`substitute`] writes the same value into every
//! occurrence. If occurrences disagree on the default, the first non-empty one
//! wins.
//!
//! Both functions are pure. Collecting values from a person is the shell's job;
//! [`collect_values`] only drives a [`ValuePrompt`] over the detected names.

use crate::error::{QuicksnipError, Result};
use std::collections::HashMap;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    /// Empty when no default was given.
    pub default: String,
}

impl Placeholder {
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

/// One marker occurrence, as byte offsets into the scanned content.
#[derive(Debug)]
struct Marker<'a> {
    start: usize,
    end: usize,
    name: &'a str,
    default: &'a str,
}

fn scan(content: &str) -> Vec<Marker<'_>> {
    let mut markers = Vec::new();
    let mut pos = 0;

    while let Some(offset) = content[pos..].find(OPEN) {
        let start = pos + offset;
        let body_start = start + OPEN.len();
        let Some(body_len) = content[body_start..].find(CLOSE) else {
            break;
        };
        let body = &content[body_start..body_start + body_len];

        if body.contains(['{', '}']) {
            // `{{{var}}}`: retry one brace later.
            pos = start + 1;
            continue;
        }

        let (name, default) = match body.split_once(':') {
            Some((name, default)) => (name.trim(), default),
            None => (body.trim(), ""),
        };
        if name.is_empty() {
            pos = body_start;
            continue;
        }

        let end = body_start + body_len + CLOSE.len();
        markers.push(Marker {
            start,
            end,
            name,
            default,
        });
        pos = end;
    }

    markers
}

/// Unique placeholders in first-occurrence order.
///
/// # Examples
/// ```
/// use quicksnip::variables::detect;
///
/// let found = detect("Hello {{name:World}}, bye {{name}} ({{short-description}})");
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[0].name, "name");
/// assert_eq!(found[0].default, "World");
/// assert_eq!(found[1].name, "short-description");
/// assert_eq!(found[1].default, "");
/// ```
pub fn detect(content: &str) -> Vec<Placeholder> {
    let mut placeholders: Vec<Placeholder> = Vec::new();
    for marker in scan(content) {
        match placeholders.iter_mut().find(|p| p.name == marker.name) {
            Some(existing) => {
                if existing.default.is_empty() && !marker.default.is_empty() {
                    existing.default = marker.default.to_string();
                }
            }
            None => placeholders.push(Placeholder {
                name: marker.name.to_string(),
                default: marker.default.to_string(),
            }),
        }
    }
    placeholders
}

/// Replaces every placeholder occurrence in a single pass.
///
/// Each occurrence gets the supplied value for its name, else that name's
/// default, else the empty string. Substituted text is never rescanned, so a
/// value that itself looks like `{{x}}` is inserted literally.
pub fn substitute(content: &str, values: &HashMap<String, String>) -> String {
    let markers = scan(content);
    if markers.is_empty() {
        return content.to_string();
    }

    let defaults: HashMap<String, String> = detect(content)
        .into_iter()
        .map(|p| (p.name, p.default))
        .collect();

    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for marker in &markers {
        out.push_str(&content[last..marker.start]);
        let value = values
            .get(marker.name)
            .or_else(|| defaults.get(marker.name))
            .map(String::as_str)
            .unwrap_or("");
        out.push_str(value);
        last = marker.end;
    }
    out.push_str(&content[last..]);
    out
}

/// Supplies a value for one placeholder, or `None` to cancel the whole operation.
pub trait ValuePrompt {
    fn prompt(&mut self, placeholder: &Placeholder) -> Option<String>;
}

impl<F> ValuePrompt for F
where
    F: FnMut(&Placeholder) -> Option<String>,
{
    fn prompt(&mut self, placeholder: &Placeholder) -> Option<String> {
        self(placeholder)
    }
}

/// Asks `prompt` for each placeholder in order.
///
/// Stops at the first cancellation with
/// [`QuicksnipError::SubstitutionIncomplete`]; in that case nothing should be
/// substituted or delivered.
pub fn collect_values<P>(placeholders: &[Placeholder], prompt: &mut P) -> Result<HashMap<String, String>>
where
    P: ValuePrompt + ?Sized,
{
    let mut values = HashMap::with_capacity(placeholders.len());
    for placeholder in placeholders {
        match prompt.prompt(placeholder) {
            Some(value) => {
                values.insert(placeholder.name.clone(), value);
            }
            None => {
                return Err(QuicksnipError::SubstitutionIncomplete(
                    placeholder.name.clone(),
                ))
            }
        }
    }
    Ok(values)
}
