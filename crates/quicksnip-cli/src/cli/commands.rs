//! # CLI Layer
//!
//! The **only** place in the workspace that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Installs a `tracing` subscriber
//! - Touches the clipboard
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: clap, see `setup.rs`
//! 2. **Context Setup**: configuration, logging, the [`QuicksnipApi`]
//! 3. **Dispatch**: one handler per subcommand
//! 4. **Output**: text through `render.rs`, or JSON with `--json`
//! 5. **Shutdown**: pending usage counts are flushed before returning

use super::prompt::{parse_presets, TerminalPrompt};
use super::render;
use super::setup::{AddArgs, Cli, Commands, EditArgs};
use crate::clipboard::copy_to_clipboard;
use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use quicksnip::tags::parse_tag_list;
use quicksnip::{NewSnippet, QuicksnipApi, QuicksnipConfig, QuicksnipError, Snippet, SnippetUpdate};
use serde::Serialize;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "QUICKSNIP_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_file = cli
        .config
        .clone()
        .unwrap_or_else(QuicksnipConfig::default_config_file);
    let config = QuicksnipConfig::load_from(Some(&config_file))
        .with_context(|| format!("loading {}", config_file.display()))?;

    // `config` must work even when the configured files are unusable.
    if let Some(Commands::Config) = &cli.command {
        return handle_config(&cli, &config, &config_file);
    }
    for problem in config.validate() {
        tracing::warn!("config: {}", problem);
    }

    let api = QuicksnipApi::open(&config)?;
    if !cli.json {
        eprint!("{}", render::render_load_report(api.load_report()));
    }

    let result = dispatch(&cli, &api, &config_file);
    let flushed = api.flush().context("saving usage counts");
    result.and(flushed)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: &Cli, api: &QuicksnipApi, config_file: &Path) -> Result<()> {
    match &cli.command {
        // Naked `qs` lists.
        None => handle_list(cli, api, None),
        Some(Commands::List { tag }) => handle_list(cli, api, tag.as_deref()),
        Some(Commands::Search { query }) => handle_search(cli, api, &query.join(" ")),
        Some(Commands::Show { id }) => handle_show(cli, api, id),
        Some(Commands::Copy {
            target,
            print,
            values,
        }) => handle_copy(cli, api, &target.join(" "), *print, values),
        Some(Commands::Add(args)) => handle_add(cli, api, args),
        Some(Commands::Edit(args)) => handle_edit(cli, api, args),
        Some(Commands::Rm { ids }) => handle_rm(cli, api, ids),
        Some(Commands::Tags { prefix, limit }) => handle_tags(cli, api, prefix.as_deref(), *limit),
        Some(Commands::Backups) => handle_backups(cli, api),
        Some(Commands::Restore { index }) => handle_restore(cli, api, *index),
        Some(Commands::Watch) => handle_watch(api),
        Some(Commands::Config) => handle_config(cli, api.config(), config_file),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_list(cli: &Cli, api: &QuicksnipApi, tag: Option<&str>) -> Result<()> {
    let mut results = api.list();
    if let Some(tag) = tag {
        let wanted = parse_tag_list(tag);
        results.retain(|hit| wanted.iter().all(|t| hit.snippet.tags.contains(t)));
    }
    if cli.json {
        return print_json(&results);
    }
    print!("{}", render::render_snippet_list(&results, false));
    Ok(())
}

fn handle_search(cli: &Cli, api: &QuicksnipApi, query: &str) -> Result<()> {
    let results = api.search(query);
    if cli.json {
        return print_json(&results);
    }
    print!("{}", render::render_snippet_list(&results, true));
    Ok(())
}

fn handle_show(cli: &Cli, api: &QuicksnipApi, id: &str) -> Result<()> {
    let snippet = api
        .get(id)
        .ok_or_else(|| QuicksnipError::NotFound(id.to_string()))?;
    if cli.json {
        return print_json(&snippet);
    }
    let placeholders = api.detect_placeholders(&snippet);
    print!(
        "{}",
        render::render_full_snippet(&snippet, api.usage_count(id), &placeholders)
    );
    Ok(())
}

/// An exact id wins; otherwise the best search hit.
fn resolve_target(api: &QuicksnipApi, target: &str) -> Result<Snippet> {
    if let Some(snippet) = api.get(target) {
        return Ok(snippet);
    }
    match api.search(target).into_iter().next() {
        Some(hit) if !target.trim().is_empty() => Ok(hit.snippet),
        _ => Err(QuicksnipError::NotFound(target.to_string()).into()),
    }
}

fn handle_copy(
    cli: &Cli,
    api: &QuicksnipApi,
    target: &str,
    print: bool,
    values: &[String],
) -> Result<()> {
    let snippet = resolve_target(api, target)?;
    let preset = parse_presets(values)?;

    let stdin = io::stdin();
    let mut prompt = TerminalPrompt::new(stdin.lock(), io::stderr(), preset);
    let text = match api.expand(&snippet.id, &mut prompt) {
        Ok(text) => text,
        Err(QuicksnipError::SubstitutionIncomplete(name)) => {
            eprintln!("{}", format!("Cancelled at '{}'; nothing copied.", name).yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if print {
        print!("{}", text);
        if io::stdout().is_terminal() && !text.ends_with('\n') {
            println!();
        }
    } else {
        copy_to_clipboard(&text)?;
        if !cli.json {
            eprint!("{}", render::success(&format!("Copied '{}' to the clipboard.", snippet.name)));
        }
    }

    api.record_use(&snippet.id);
    Ok(())
}

fn read_stdin_content() -> Result<String> {
    if io::stdin().is_terminal() {
        bail!("no content given; pass --content or pipe it on stdin");
    }
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("reading content from stdin")?;
    Ok(content)
}

fn handle_add(cli: &Cli, api: &QuicksnipApi, args: &AddArgs) -> Result<()> {
    let content = match &args.content {
        Some(content) => content.clone(),
        None => read_stdin_content()?,
    };
    let mut new = NewSnippet::new(args.name.clone(), content)
        .with_description(args.description.clone())
        .with_tags(parse_tag_list(&args.tags));
    if let Some(id) = &args.id {
        new = new.with_id(id.clone());
    }

    let snippet = api.add(new)?;
    if cli.json {
        return print_json(&snippet);
    }
    print!("{}", render::success(&format!("Added {}", snippet.id)));
    Ok(())
}

fn handle_edit(cli: &Cli, api: &QuicksnipApi, args: &EditArgs) -> Result<()> {
    let update = SnippetUpdate {
        name: args.name.clone(),
        description: args.description.clone(),
        content: args.content.clone(),
        tags: args.tags.as_deref().map(parse_tag_list),
    };
    if update.is_empty() {
        bail!("nothing to change; pass --name, --description, --content or --tags");
    }

    let snippet = api
        .update(&args.id, update)?
        .ok_or_else(|| QuicksnipError::NotFound(args.id.clone()))?;
    if cli.json {
        return print_json(&snippet);
    }
    print!("{}", render::success(&format!("Updated {}", snippet.id)));
    Ok(())
}

fn handle_rm(cli: &Cli, api: &QuicksnipApi, ids: &[String]) -> Result<()> {
    let removed = api.remove(ids)?;
    if cli.json {
        return print_json(&removed);
    }
    for id in ids.iter().filter(|id| !removed.contains(id)) {
        eprintln!("{}", format!("No snippet '{}'", id).yellow());
    }
    if removed.is_empty() {
        bail!("nothing removed");
    }
    print!("{}", render::success(&format!("Removed {}", removed.join(", "))));
    Ok(())
}

fn handle_tags(cli: &Cli, api: &QuicksnipApi, prefix: Option<&str>, limit: usize) -> Result<()> {
    let tags = match prefix {
        Some(prefix) => api.suggest_tags(prefix, limit),
        None => api.all_tags(),
    };
    if cli.json {
        return print_json(&tags);
    }
    print!("{}", render::render_tags(&tags));
    Ok(())
}

fn handle_backups(cli: &Cli, api: &QuicksnipApi) -> Result<()> {
    let backups = api.list_backups()?;
    if cli.json {
        return print_json(&backups);
    }
    print!("{}", render::render_backups(&backups));
    Ok(())
}

fn handle_restore(cli: &Cli, api: &QuicksnipApi, index: usize) -> Result<()> {
    let restored = api.restore_backup(index)?;
    if cli.json {
        return print_json(restored.as_ref());
    }
    print!(
        "{}",
        render::success(&format!(
            "Restored backup {} ({} snippets)",
            index,
            restored.len()
        ))
    );
    Ok(())
}

/// Runs until stdin closes (Ctrl-D), then returns so `run` can flush.
fn handle_watch(api: &QuicksnipApi) -> Result<()> {
    api.subscribe(|snapshot| {
        println!(
            "{} {} snippets",
            "reloaded:".green(),
            snapshot.len()
        );
    });
    let handle = api.watch()?;
    eprintln!(
        "{} {} {}",
        "watching".dimmed(),
        handle.path().display(),
        "(Ctrl-D to stop)".dimmed()
    );
    io::copy(&mut io::stdin().lock(), &mut io::sink()).context("reading stdin")?;
    drop(handle);
    Ok(())
}

#[derive(Serialize)]
struct ConfigView<'a> {
    config_file: PathBuf,
    snippet_file: PathBuf,
    usage_file: PathBuf,
    settings: &'a QuicksnipConfig,
    problems: Vec<String>,
}

fn handle_config(cli: &Cli, config: &QuicksnipConfig, config_file: &Path) -> Result<()> {
    let problems = config.validate();
    if cli.json {
        return print_json(&ConfigView {
            config_file: config_file.to_path_buf(),
            snippet_file: config.snippet_path(),
            usage_file: config.usage_path(),
            settings: config,
            problems,
        });
    }
    print!("{}", render::render_config(config, config_file, &problems));
    Ok(())
}
