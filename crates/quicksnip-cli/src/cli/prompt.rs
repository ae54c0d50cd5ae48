//! Terminal collection of placeholder values.
//!
//! One line per placeholder. An empty line takes the default; end of input
//! (Ctrl-D) cancels the whole copy. Values given with `--set` are used without
//! asking.

use colored::Colorize;
use quicksnip::variables::{Placeholder, ValuePrompt};
use std::collections::HashMap;
use std::io::{BufRead, Write};

pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    preset: HashMap<String, String>,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W, preset: HashMap<String, String>) -> Self {
        Self {
            input,
            output,
            preset,
        }
    }

    fn ask(&mut self, placeholder: &Placeholder) -> std::io::Result<Option<String>> {
        if placeholder.has_default() {
            write!(
                self.output,
                "{} [{}]: ",
                placeholder.name.bold(),
                placeholder.default.dimmed()
            )?;
        } else {
            write!(self.output, "{}: ", placeholder.name.bold())?;
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let value = line.trim_end_matches(['\n', '\r']);
        if value.is_empty() {
            Ok(Some(placeholder.default.clone()))
        } else {
            Ok(Some(value.to_string()))
        }
    }
}

impl<R: BufRead, W: Write> ValuePrompt for TerminalPrompt<R, W> {
    fn prompt(&mut self, placeholder: &Placeholder) -> Option<String> {
        if let Some(value) = self.preset.get(&placeholder.name) {
            return Some(value.clone());
        }
        match self.ask(placeholder) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "could not read placeholder value");
                None
            }
        }
    }
}

/// Parses `NAME=VALUE` pairs from `--set`. The value may contain `=`.
pub fn parse_presets(pairs: &[String]) -> anyhow::Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => anyhow::bail!("expected NAME=VALUE, got '{}'", pair),
        })
        .collect()
}
