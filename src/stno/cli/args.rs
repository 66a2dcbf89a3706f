use clap::{Parser, Subcommand};
use once_cell::sync::Lazy;
use std::path::PathBuf;

/// `git describe` output captured by the build script, empty outside a checkout.
const BUILD: &str = env!("STNO_BUILD");

static VERSION: Lazy<String> = Lazy::new(|| version_string(env!("CARGO_PKG_VERSION"), BUILD));

/// A tagged clean build reports the bare package version; anything else
/// appends the describe output, e.g. `0.3.0 (v0.3.0-4-g1a2b3c4+)`.
fn version_string(package: &str, build: &str) -> String {
    let tag = build.strip_prefix('v').unwrap_or(build);
    if build.is_empty() || tag == package {
        package.to_string()
    } else {
        format!("{} ({})", package, build)
    }
}

#[derive(Parser, Debug)]
#[command(name = "stno", bin_name = "stno", version = VERSION.as_str())]
#[command(about = "Structured notebook: TOML entries named by templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Notebook to operate on (defaults to the configured default notebook)
    #[arg(short, long, global = true)]
    pub notebook: Option<String>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new entry
    #[command(alias = "a", display_order = 1)]
    Add {
        /// Read the entry from a file instead of opening the editor ("-" for stdin)
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Edit an existing entry in the editor
    #[command(alias = "e", display_order = 2)]
    Edit {
        /// Identifier of the entry
        uid: String,
    },

    /// Print one or more entries
    #[command(alias = "v", display_order = 3)]
    View {
        /// Identifiers of the entries
        #[arg(required = true, num_args = 1..)]
        uids: Vec<String>,
    },

    /// List entry identifiers
    #[command(alias = "ls", display_order = 4)]
    List {
        /// Only identifiers starting with this prefix
        prefix: Option<String>,
    },

    /// Print all entries as one TOML document
    #[command(alias = "q", display_order = 5)]
    Query {
        /// Section of the notebook to query (e.g. work or work/2020)
        path: Option<String>,

        /// Keep entries where KEY has VALUE (repeatable)
        #[arg(short, long = "where", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Only print these fields (comma separated)
        #[arg(short, long, value_delimiter = ',', value_name = "FIELDS")]
        select: Vec<String>,

        /// Stop after this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Remove one or more entries
    #[command(alias = "remove", display_order = 6)]
    Rm {
        /// Identifiers of the entries
        #[arg(required = true, num_args = 1..)]
        uids: Vec<String>,
    },

    /// Rename an entry (use section/name to move it into a section)
    #[command(alias = "rename", display_order = 7)]
    Mv {
        src: String,
        dest: String,
    },

    /// Get or set configuration
    #[command(display_order = 8)]
    Config {
        /// Configuration key (e.g., default-notebook)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_query_options() {
        let cli = Cli::try_parse_from([
            "stno", "-n", "work", "query", "meetings", "--where", "kind=retro", "-w", "year=2020",
            "--select", "title,datetime", "--limit", "3",
        ])
        .unwrap();
        assert_eq!(cli.notebook.as_deref(), Some("work"));
        match cli.command {
            Some(Commands::Query {
                path,
                filters,
                select,
                limit,
            }) => {
                assert_eq!(path.as_deref(), Some("meetings"));
                assert_eq!(filters, vec!["kind=retro", "year=2020"]);
                assert_eq!(select, vec!["title", "datetime"]);
                assert_eq!(limit, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parses_add_from_stdin() {
        let cli = Cli::try_parse_from(["stno", "add", "--file", "-"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Add { file: Some(ref p) }) if p == &PathBuf::from("-")
        ));
    }

    #[test]
    fn test_no_command_is_allowed() {
        let cli = Cli::try_parse_from(["stno", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn test_view_requires_uids() {
        assert!(Cli::try_parse_from(["stno", "view"]).is_err());
    }

    #[test]
    fn test_version_string() {
        assert_eq!(version_string("0.3.0", ""), "0.3.0");
        assert_eq!(version_string("0.3.0", "v0.3.0"), "0.3.0");
        assert_eq!(version_string("0.3.0", "v0.3.0+"), "0.3.0 (v0.3.0+)");
        assert_eq!(
            version_string("0.3.0", "v0.2.1-4-g1a2b3c4"),
            "0.3.0 (v0.2.1-4-g1a2b3c4)"
        );
    }
}
