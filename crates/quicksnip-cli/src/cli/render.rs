//! # Rendering Module
//!
//! Plain `colored` output. Layout math (width, truncation, padding) is done on
//! display width with `unicode-width`, so names with wide characters still line
//! up. Functions here build strings; `commands.rs` decides where they go.
//!
//! List layout, one row per snippet:
//!
//! ```text
//!  3  flask-run           Flask development server      python flask      2 days ago
//!  ^  ^ id (COL_ID)       ^ name (fill)                 ^ tags            ^ modified
//!  uses
//! ```

use chrono::{DateTime, Utc};
use colored::Colorize;
use quicksnip::search::RankedSnippet;
use quicksnip::store::{BackupInfo, LoadReport};
use quicksnip::variables::Placeholder;
use quicksnip::{QuicksnipConfig, Snippet};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const COL_USES: usize = 4;
pub const COL_ID: usize = 20;
pub const COL_TAGS: usize = 22;
pub const TIME_WIDTH: usize = 14;

pub fn render_snippet_list(results: &[RankedSnippet], show_scores: bool) -> String {
    if results.is_empty() {
        return format!("{}\n", "No snippets found.".dimmed());
    }

    let mut out = String::new();
    for hit in results {
        let snippet = &hit.snippet;
        let uses = format!("{:>width$}", hit.uses, width = COL_USES - 1);
        let id = pad_to_width(&truncate_to_width(&snippet.id, COL_ID - 1), COL_ID);
        let tags = pad_to_width(&truncate_to_width(&snippet.joined_tags(), COL_TAGS - 1), COL_TAGS);
        let score = if show_scores {
            format!("{:>6.1} ", hit.score)
        } else {
            String::new()
        };

        let fixed = COL_USES + COL_ID + COL_TAGS + TIME_WIDTH + score.width();
        let name_width = LINE_WIDTH.saturating_sub(fixed);
        let name = pad_to_width(&truncate_to_width(&snippet.name, name_width.saturating_sub(1)), name_width);

        out.push_str(&format!(
            "{} {}{}{}{}{}\n",
            uses.dimmed(),
            id.yellow(),
            name,
            tags.cyan(),
            score.dimmed(),
            format_time_ago(snippet.modified).dimmed()
        ));
    }
    out
}

pub fn render_full_snippet(snippet: &Snippet, uses: u64, placeholders: &[Placeholder]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", snippet.id.yellow(), snippet.name.bold()));
    if !snippet.description.is_empty() {
        out.push_str(&format!("{}\n", snippet.description.dimmed()));
    }
    if !snippet.tags.is_empty() {
        out.push_str(&format!("tags: {}\n", snippet.joined_tags().cyan()));
    }
    out.push_str(&format!(
        "used {} {}, modified {}\n",
        uses,
        if uses == 1 { "time" } else { "times" },
        format_time_ago(snippet.modified).trim_start()
    ));
    out.push_str("--------------------------------\n");
    out.push_str(&snippet.content);
    if !snippet.content.ends_with('\n') {
        out.push('\n');
    }

    if !placeholders.is_empty() {
        out.push_str("--------------------------------\n");
        for placeholder in placeholders {
            if placeholder.has_default() {
                out.push_str(&format!(
                    "{} {}\n",
                    placeholder.name.bold(),
                    format!("(default: {})", placeholder.default).dimmed()
                ));
            } else {
                out.push_str(&format!("{}\n", placeholder.name.bold()));
            }
        }
    }
    out
}

pub fn render_backups(backups: &[BackupInfo]) -> String {
    if backups.is_empty() {
        return format!("{}\n", "No backups yet.".dimmed());
    }
    backups
        .iter()
        .map(|backup| {
            let when = backup
                .modified
                .map(format_time_ago)
                .unwrap_or_else(|| format!("{:>width$}", "unknown", width = TIME_WIDTH));
            format!(
                "{:>3}  {}  {}\n",
                backup.index.to_string().yellow(),
                when.dimmed(),
                backup.path.display()
            )
        })
        .collect()
}

pub fn render_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return format!("{}\n", "No tags.".dimmed());
    }
    tags.iter().map(|tag| format!("{}\n", tag.cyan())).collect()
}

pub fn render_config(config: &QuicksnipConfig, config_file: &std::path::Path, problems: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", "config file:".dimmed(), config_file.display()));
    let rows: [(&str, String); 7] = [
        ("snippet_file", config.snippet_path().display().to_string()),
        ("usage_file", config.usage_path().display().to_string()),
        ("fuzzy_threshold", config.fuzzy_threshold.to_string()),
        ("max_results", config.max_results.to_string()),
        ("backup_count", config.backup_count.to_string()),
        ("reload_debounce_ms", config.reload_debounce_ms.to_string()),
        ("usage_flush_ms", config.usage_flush_ms.to_string()),
    ];
    for (key, value) in rows {
        out.push_str(&format!("{} = {}\n", key.bold(), value));
    }
    for problem in problems {
        out.push_str(&format!("{}\n", format!("warning: {}", problem).yellow()));
    }
    out
}

/// Load problems worth telling a person about, one line each.
pub fn render_load_report(report: &LoadReport) -> String {
    let mut out = String::new();
    if report.created_defaults {
        out.push_str(&format!("{}\n", "Created a sample snippet library.".green()));
    }
    if let Some(index) = report.recovered_from_backup {
        out.push_str(&format!(
            "{}\n",
            format!("Snippet file was corrupt; recovered from backup {}.", index).yellow()
        ));
    }
    for error in report.errors() {
        out.push_str(&format!("{}\n", format!("warning: {}", error).yellow()));
    }
    out
}

pub fn success(message: &str) -> String {
    format!("{}\n", message.green())
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let c = if c == '\n' { ' ' } else { c };
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quicksnip::variables::detect;

    fn snippet(id: &str, name: &str) -> Snippet {
        let created = Utc::now() - Duration::days(2);
        Snippet {
            id: id.to_string(),
            name: name.to_string(),
            description: "desc".to_string(),
            content: "echo {{who:world}}".to_string(),
            tags: vec!["shell".to_string(), "demo".to_string()],
            created,
            modified: created,
        }
    }

    fn ranked(snippet: Snippet, uses: u64) -> RankedSnippet {
        RankedSnippet {
            snippet,
            score: 87.5,
            uses,
        }
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("a long snippet name", 8), "a long …");
        assert_eq!(truncate_to_width("日本語のテキスト", 7), "日本語…");
    }

    #[test]
    fn test_pad_to_width_counts_display_columns() {
        assert_eq!(pad_to_width("日本", 6), "日本  ");
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }

    #[test]
    fn test_list_rows_have_fixed_width() {
        colored::control::set_override(false);
        let results = vec![
            ranked(snippet("flask-run", "Flask development server"), 3),
            ranked(snippet("x", &"very long name ".repeat(10)), 0),
        ];
        let out = render_snippet_list(&results, false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("flask-run"));
        assert!(lines[0].contains("shell demo"));
        assert!(lines[0].contains("2 days ago"));
        assert_eq!(lines[0].width(), lines[1].width());
    }

    #[test]
    fn test_list_shows_scores_on_request() {
        colored::control::set_override(false);
        let out = render_snippet_list(&[ranked(snippet("a", "A"), 0)], true);
        assert!(out.contains("87.5"));
    }

    #[test]
    fn test_empty_list() {
        colored::control::set_override(false);
        assert_eq!(render_snippet_list(&[], false), "No snippets found.\n");
    }

    #[test]
    fn test_full_snippet_lists_placeholders() {
        colored::control::set_override(false);
        let s = snippet("greet", "Greeting");
        let out = render_full_snippet(&s, 1, &detect(&s.content));
        assert!(out.starts_with("greet Greeting\ndesc\ntags: shell demo\nused 1 time"));
        assert!(out.contains("echo {{who:world}}\n"));
        assert!(out.ends_with("who (default: world)\n"));
    }

    #[test]
    fn test_load_report_lines() {
        colored::control::set_override(false);
        let report = LoadReport {
            invalid_entries: vec!["entry 2: missing 'id'".to_string()],
            recovered_from_backup: Some(1),
            corruption: Some("bad yaml".to_string()),
            ..Default::default()
        };
        let out = render_load_report(&report);
        assert!(out.contains("recovered from backup 1"));
        assert!(out.contains("entry 2: missing 'id'"));
        assert!(out.contains("bad yaml"));
        assert!(render_load_report(&LoadReport::default()).is_empty());
    }

    #[test]
    fn test_config_lists_every_key() {
        colored::control::set_override(false);
        let out = render_config(
            &QuicksnipConfig::default(),
            std::path::Path::new("/tmp/config.toml"),
            &["max_results must be between 5 and 20 (got 2)".to_string()],
        );
        assert!(out.contains("config file: /tmp/config.toml"));
        assert!(out.contains("fuzzy_threshold = 60"));
        assert!(out.contains("usage_flush_ms = 2000"));
        assert!(out.contains("warning: max_results"));
    }
}
