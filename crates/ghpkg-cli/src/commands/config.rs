//! CLI handlers for the `ghpkg config` subcommand.

use anyhow::Result;
use ghpkg_config::loader::{CONFIG_DIR_NAME, ghpkg_home};
use ghpkg_config::{ConfigResult, ResolvedConfig, ShowFormat};

use super::OutputFormat;
use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(
    resolved: ConfigResult<ResolvedConfig>,
    format: OutputFormat,
    section: Option<&str>,
) -> Result<()> {
    let resolved = resolved?;
    let show_format = match format {
        OutputFormat::Json => ShowFormat::Json,
        OutputFormat::Pretty => ShowFormat::Toml,
    };

    let output = resolved
        .show(show_format, section)
        .map_err(|_| match section {
            Some(name) => anyhow::anyhow!("no config section named '{name}'"),
            None => anyhow::anyhow!("failed to format config"),
        })?;

    println!("{output}");
    Ok(())
}

/// Validate the current configuration.
pub(crate) fn validate_config(resolved: ConfigResult<ResolvedConfig>) -> Result<()> {
    let resolved = resolved?;
    println!("{}", Theme::success("Configuration is valid."));
    if !resolved.loaded_files.is_empty() {
        println!("\nLoaded files:");
        for path in &resolved.loaded_files {
            println!("  - {path}");
        }
    }
    Ok(())
}

/// Show all config file paths that are checked.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn show_paths() -> Result<()> {
    let mut paths = Vec::new();
    match ghpkg_home() {
        Ok(home) => paths.push(home.join("config.toml")),
        Err(e) => eprintln!("{}", Theme::warning(&e.to_string())),
    }
    if let Ok(dir) = std::env::var("GHPKG_HOME") {
        paths.push(std::path::PathBuf::from(dir).join("config.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_DIR_NAME).join("config.toml"));
    }

    println!("Configuration files checked (in precedence order):\n");
    for (i, path) in paths.iter().enumerate() {
        let status = if path.exists() { "found" } else { "not found" };
        println!("  {}. {}  [{status}]", i.saturating_add(1), path.display());
    }

    println!("\nEnvironment variable fallbacks:");
    for (var, field) in [
        ("GHPKG_GITHUB_TOKEN", "github.token"),
        ("GITHUB_TOKEN", "github.token"),
        ("GHPKG_API_ROOT", "github.api_root"),
        ("GHPKG_PROXY_ROOT", "github.proxy_root"),
        ("GHPKG_NO_GITHUB_PROXY", "github.no_github_proxy"),
        ("GHPKG_TIMEOUT_SECS", "github.timeout_secs"),
        ("GHPKG_TARGET", "target.id"),
        ("GHPKG_CACHE_DIR", "cache.directory"),
        ("GHPKG_LOG_LEVEL", "logging.level"),
    ] {
        println!("  {var:<22} -> {field}");
    }

    Ok(())
}
