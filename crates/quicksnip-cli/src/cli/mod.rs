//! # CLI Behavior
//!
//! This is **one possible shell** for quicksnip, standing in for the popup
//! window a desktop user would see. It only knows about terminal I/O, the
//! clipboard, exit codes and output formatting.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ### Naked Execution (`qs`)
//!
//! Running `qs` with no arguments lists the library, most used first.
//!
//! ### Delivering a Snippet (`qs copy`)
//!
//! `qs copy <id|query>` picks the snippet with that id, or else the best match
//! for the query. Each placeholder is asked for on the terminal with its
//! default in brackets; an empty answer takes the default, Ctrl-D cancels and
//! nothing is copied. The text goes to the clipboard (`--print` writes it to
//! stdout instead) and the use is counted.
//!
//! ### Output
//!
//! Every read command accepts `--json` for scripting. Diagnostics go to
//! stderr; set `QUICKSNIP_LOG=debug` for more.
//!
//! ## Module Structure
//!
//! - `commands`: Per-command handlers that call the API and print results
//! - `prompt`: Placeholder value collection on the terminal
//! - `render`: Output formatting (tables, colors, messages)
//! - `setup`: Argument parsing via clap, help text

mod commands;
mod prompt;
mod render;
pub mod setup;

pub use commands::run;
