//! # qs: the Quicksnip Terminal Shell
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/quicksnip/`: core library, UI-agnostic
//! - `crates/quicksnip-cli/`: this shell, depends on the `quicksnip` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/quicksnip-cli/src/cli/)                  │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Dispatch + API wiring (commands.rs)                      │
//! │  - Placeholder prompts on the terminal (prompt.rs)          │
//! │  - Colored terminal output (render.rs)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/quicksnip/src/api.rs)                    │
//! │  - Search, editing, placeholders, usage, backups, watching  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward is UI agnostic. This crate is therefore
//! responsible for **all** user-facing concerns: argument parsing, logging
//! setup, prompting, clipboard delivery, rendering and exit codes.
//!
//! ## Testing Approach
//!
//! - Library behavior is tested in the `quicksnip` crate.
//! - Rendering and prompting are unit tested here against in-memory buffers.
//! - `tests/cli_e2e.rs` drives the built binary with `assert_cmd`, pointing it
//!   at a scratch directory through `QUICKSNIP_*` environment variables.

mod cli;
mod clipboard;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
