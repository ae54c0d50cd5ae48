use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "qs",
    bin_name = "qs",
    version,
    disable_help_subcommand = true,
    after_help = "Placeholders in snippet content look like {{name}} or {{name:default}}.\n`qs copy` asks for each value on the terminal; Ctrl-D cancels."
)]
#[command(about = "Fuzzy snippet library with placeholders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every snippet, most used first
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Only snippets carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Fuzzy search names, descriptions, tags and content
    #[command(alias = "s", display_order = 2)]
    Search {
        /// Query words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show one snippet in full
    #[command(alias = "v", display_order = 3)]
    Show { id: String },

    /// Fill in placeholders and copy a snippet to the clipboard
    #[command(alias = "c", display_order = 4)]
    Copy {
        /// Snippet id, or a query whose best match is used
        #[arg(required = true, num_args = 1..)]
        target: Vec<String>,

        /// Print to stdout instead of the clipboard
        #[arg(short, long)]
        print: bool,

        /// Preset a placeholder value (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        values: Vec<String>,
    },

    /// Add a snippet; content comes from --content or stdin
    #[command(alias = "a", display_order = 10)]
    Add(AddArgs),

    /// Change fields of a snippet
    #[command(alias = "e", display_order = 11)]
    Edit(EditArgs),

    /// Delete snippets
    #[command(alias = "del", display_order = 12)]
    Rm {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List tags, or suggest tags for a prefix
    #[command(display_order = 20)]
    Tags {
        prefix: Option<String>,

        /// Maximum number of suggestions
        #[arg(short, long, default_value_t = quicksnip::tags::DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },

    /// List snippet file backups, newest first
    #[command(display_order = 30)]
    Backups,

    /// Replace the snippet file with a backup
    #[command(display_order = 31)]
    Restore {
        /// Backup number as shown by `qs backups`
        index: usize,
    },

    /// Print a line whenever the snippet file changes on disk, until stdin closes
    #[command(display_order = 40)]
    Watch,

    /// Show the effective configuration
    #[command(display_order = 50)]
    Config,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Snippet name
    #[arg(short, long)]
    pub name: String,

    /// Explicit id (derived from the name when omitted)
    #[arg(long)]
    pub id: Option<String>,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Snippet content (read from stdin when omitted)
    #[arg(short, long)]
    pub content: Option<String>,

    /// Comma-separated tags
    #[arg(short, long, default_value = "")]
    pub tags: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub content: Option<String>,

    /// Comma-separated tags; replaces the existing ones
    #[arg(short, long)]
    pub tags: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_copy_with_values() {
        let cli = Cli::try_parse_from([
            "qs", "copy", "flask", "server", "--print", "--set", "port=8080",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Copy {
                target,
                print,
                values,
            }) => {
                assert_eq!(target, vec!["flask", "server"]);
                assert!(print);
                assert_eq!(values, vec!["port=8080"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_json_after_subcommand() {
        let cli = Cli::try_parse_from(["qs", "list", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::List { tag: None })));
    }

    #[test]
    fn test_parse_naked_invocation() {
        let cli = Cli::try_parse_from(["qs"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["qs", "search"]).is_err());
    }
}
