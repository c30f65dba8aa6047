//! ghpkg - resolve, inspect and fetch GitHub-hosted packages.
//!
//! Loads the layered configuration, installs logging, and dispatches to one
//! subcommand. Every network command goes through a single `GitHubClient`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cache;
mod commands;
mod config_bridge;
mod theme;

use commands::{Context, OutputFormat};
use ghpkg_config::{Config, ConfigResult, ResolvedConfig};
use theme::Theme;

/// ghpkg - GitHub package source resolver
#[derive(Parser, Debug)]
#[command(name = "ghpkg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a repository reference and print its canonical form
    Parse {
        /// `owner/repo[#tag]`, a GitHub URL, or `github:owner/repo`
        reference: String,
    },

    /// Show the policy verdict for a repository
    Status {
        /// Repository reference
        reference: String,
    },

    /// Look up repository metadata
    Repo {
        /// Repository reference
        reference: String,
    },

    /// List tags or branches in version order
    Refs {
        /// Repository reference
        repo: String,
        /// Ref namespace
        #[arg(short, long, default_value = "tags", value_parser = ["tags", "heads"])]
        namespace: String,
    },

    /// Show the most recent version of a repository
    Latest {
        /// Repository reference
        reference: String,
    },

    /// Resolve a tag, branch or SHA to a commit SHA
    Resolve {
        /// Repository reference
        repo: String,
        /// Tag, branch, or 40-character SHA
        tag_or_sha: String,
    },

    /// Fetch and show the package manifest
    Manifest {
        /// Repository reference
        reference: String,
    },

    /// Fetch the package files at the referenced version
    Fetch {
        /// Repository reference
        reference: String,
        /// Write the files into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Ignore and do not update the snapshot cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Search for packages, or look up `owner/repo|owner/repo` links
    Search {
        /// Free text or `|`-separated repository links
        query: String,
    },

    /// Publish files as a private gist
    Gist {
        /// Files to publish
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Gist description
        #[arg(long)]
        name: String,
        /// Existing gist to update
        #[arg(long)]
        id: Option<String>,
        /// Always create a new gist
        #[arg(long)]
        new: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations (`--format json`
    /// for JSON, TOML otherwise)
    Show {
        /// Show only a specific section (e.g. github, packages, target)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Validate the current configuration
    Validate,
    /// Show config file paths being checked
    Paths,
}

fn log_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

fn init_logging(resolved: &ConfigResult<ResolvedConfig>, verbose: u8) {
    let mut log_config = match resolved {
        Ok(r) => config_bridge::to_log_config(&r.config),
        Err(_) => ghpkg_telemetry::LogConfig::default(),
    };
    if let Some(level) = log_level(verbose) {
        level.clone_into(&mut log_config.level);
    }
    if let Err(e) = ghpkg_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}", Theme::error(&format!("{e:#}")));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let workspace_root = std::env::current_dir().ok();
    let resolved = Config::load(workspace_root.as_deref());
    init_logging(&resolved, cli.verbose);

    let format = match cli.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Pretty,
    };

    match cli.command {
        Commands::Config { command } => return handle_config(command, resolved, format),
        Commands::Parse { reference } => return commands::repo::parse(&reference, format),
        _ => {},
    }

    let config = resolved?.config;
    if let Commands::Status { reference } = &cli.command {
        let policy = config_bridge::to_policy_config(&config);
        return commands::repo::status(reference, &policy, format);
    }

    let ctx = Context::new(config, format)?;
    match cli.command {
        Commands::Repo { reference } => commands::repo::repo(&ctx, &reference).await,
        Commands::Refs { repo, namespace } => commands::refs::list(&ctx, &repo, &namespace).await,
        Commands::Latest { reference } => commands::repo::latest(&ctx, &reference).await,
        Commands::Resolve { repo, tag_or_sha } => {
            commands::refs::resolve(&ctx, &repo, &tag_or_sha).await
        },
        Commands::Manifest { reference } => commands::fetch::manifest(&ctx, &reference).await,
        Commands::Fetch {
            reference,
            out,
            no_cache,
        } => commands::fetch::fetch(&ctx, &reference, out.as_deref(), no_cache).await,
        Commands::Search { query } => commands::search::search(&ctx, &query).await,
        Commands::Gist {
            files,
            name,
            id,
            new,
        } => commands::gist::publish(&ctx, &files, &name, id, new).await,
        Commands::Parse { .. } | Commands::Status { .. } | Commands::Config { .. } => Ok(()),
    }
}

fn handle_config(
    command: ConfigCommands,
    resolved: ConfigResult<ResolvedConfig>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show { section } => {
            commands::config::show_config(resolved, format, section.as_deref())
        },
        ConfigCommands::Validate => commands::config::validate_config(resolved),
        ConfigCommands::Paths => commands::config::show_paths(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ghpkg").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_refs_namespace_default_and_choice() {
        let cli = parse(&["refs", "octo/hello"]);
        assert!(matches!(cli.command, Commands::Refs { ref namespace, .. } if namespace == "tags"));

        let cli = parse(&["refs", "octo/hello", "--namespace", "heads"]);
        assert!(matches!(cli.command, Commands::Refs { ref namespace, .. } if namespace == "heads"));

        assert!(Cli::try_parse_from(["ghpkg", "refs", "octo/hello", "-n", "notes"]).is_err());
    }

    #[test]
    fn test_fetch_flags() {
        let cli = parse(&["fetch", "octo/hello#v1", "--out", "vendor", "--no-cache"]);
        match cli.command {
            Commands::Fetch {
                reference,
                out,
                no_cache,
            } => {
                assert_eq!(reference, "octo/hello#v1");
                assert_eq!(out, Some(PathBuf::from("vendor")));
                assert!(no_cache);
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_gist_requires_files_and_name() {
        assert!(Cli::try_parse_from(["ghpkg", "gist", "--name", "x"]).is_err());
        assert!(Cli::try_parse_from(["ghpkg", "gist", "a.ts"]).is_err());

        let cli = parse(&["gist", "a.ts", "b.ts", "--name", "demo", "--id", "abc", "--new"]);
        match cli.command {
            Commands::Gist {
                files,
                name,
                id,
                new,
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(name, "demo");
                assert_eq!(id.as_deref(), Some("abc"));
                assert!(new);
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["search", "neopixel", "--format", "json", "-vv"]);
        assert_eq!(cli.format, "json");
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_level(cli.verbose), Some("trace"));
        assert_eq!(log_level(0), None);
    }

    #[test]
    fn test_config_show_section() {
        let cli = parse(&["config", "show", "--section", "github", "--format", "json"]);
        assert_eq!(cli.format, "json");
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Show { section },
            } => {
                assert_eq!(section.as_deref(), Some("github"));
            },
            other => panic!("unexpected command {other:?}"),
        }
    }
}
