//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.ghpkg/config.toml` (user)
//! 3. Merge `{workspace}/.ghpkg/config.toml` (workspace) + restriction enforcement
//! 4. Apply env var fallbacks for unset fields
//! 5. Resolve `${VAR}` references, then deserialize → `Config`
//! 6. Validate
//! 7. Return `ResolvedConfig`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::env::{
    apply_env_fallbacks, collect_env_vars, resolve_env_references,
    resolve_env_references_restricted,
};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{
    ConfigLayer, FieldSources, deep_merge_tracking, enforce_restrictions, record_all_leaves,
};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Name of the per-user and per-workspace config directory.
pub const CONFIG_DIR_NAME: &str = ".ghpkg";

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load the unified configuration with layered file precedence.
///
/// `workspace_root` is the root of the current project. If `None`, the
/// workspace layer is skipped.
///
/// `home_override` is treated as the ghpkg directory itself (the one holding
/// `config.toml`), bypassing `~/.ghpkg` and `GHPKG_HOME`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(
    workspace_root: Option<&Path>,
    home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    load_with_env(workspace_root, home_override, &collect_env_vars())
}

fn load_with_env(
    workspace_root: Option<&Path>,
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_all_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    let user_config = match home_override {
        Some(dir) => {
            let path = dir.join("config.toml");
            try_load_file(&path)?.map(|overlay| (overlay, path))
        },
        None => discover_user_config(env_vars)?,
    };

    if let Some((overlay, path)) = user_config {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::User,
            &mut field_sources,
        );
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded user config");
    }

    if let Some(ws_root) = workspace_root {
        let ws_path = ws_root.join(CONFIG_DIR_NAME).join("config.toml");
        if let Some(mut overlay) = try_load_file(&ws_path)? {
            resolve_env_references_restricted(&mut overlay, env_vars);

            let baseline = merged.clone();
            deep_merge_tracking(
                &mut merged,
                &overlay,
                "",
                &ConfigLayer::Workspace,
                &mut field_sources,
            );
            enforce_restrictions(&mut merged, &baseline, &overlay);

            loaded_files.push(ws_path.display().to_string());
            info!(path = %ws_path.display(), "loaded workspace config");
        }
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    resolve_env_references(&mut merged, env_vars);
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// `~/.ghpkg/config.toml`, falling back to `$GHPKG_HOME/config.toml`.
fn discover_user_config(
    env_vars: &HashMap<String, String>,
) -> ConfigResult<Option<(toml::Value, PathBuf)>> {
    let home_dir = home_directory()?;
    let user_path = home_dir.join(CONFIG_DIR_NAME).join("config.toml");
    if let Some(overlay) = try_load_file(&user_path)? {
        return Ok(Some((overlay, user_path)));
    }

    let Some(raw) = env_vars.get("GHPKG_HOME") else {
        return Ok(None);
    };
    let Some(dir) = validate_ghpkg_home(raw, &home_dir) else {
        warn!(
            path = raw,
            "GHPKG_HOME is not a valid directory owned by current user; ignoring"
        );
        return Ok(None);
    };
    let path = dir.join("config.toml");
    Ok(try_load_file(&path)?.map(|overlay| (overlay, path)))
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let Some(value) = try_load_file(path)? else {
        return Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    };
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// Uses a single read so there is no window between an existence check and
/// the read.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// `GHPKG_HOME` must be an existing directory owned by the owner of
/// `home_dir`. Returns the canonicalized path.
fn validate_ghpkg_home(raw_path: &str, home_dir: &Path) -> Option<PathBuf> {
    let canonical = PathBuf::from(raw_path).canonicalize().ok()?;
    if !canonical.is_dir() {
        return None;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let dir_uid = canonical.metadata().ok()?.uid();
        let home_uid = home_dir.metadata().ok()?.uid();
        if dir_uid != home_uid {
            return None;
        }
    }

    #[cfg(not(unix))]
    let _ = home_dir;

    Some(canonical)
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

/// The user's ghpkg directory (`~/.ghpkg`).
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if the home directory is unknown.
pub fn ghpkg_home() -> ConfigResult<PathBuf> {
    Ok(home_directory()?.join(CONFIG_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_defaults_deserialize_to_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config.github.api_root, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 60);
        assert_eq!(config.target.manifest_name, "ghpkg.json");
        assert_eq!(config.logging.level, "warn");
        assert!(config.cache.enabled);
        assert!(config.github.proxy_root.is_none());
    }

    #[test]
    fn test_load_defaults_only() {
        let home = tempfile::tempdir().unwrap();
        let resolved = load_with_env(None, Some(home.path()), &HashMap::new()).unwrap();

        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("github.api_root"),
            Some(&ConfigLayer::Defaults)
        );
        assert!(!resolved.config.github.use_proxy());
    }

    #[test]
    fn test_user_then_workspace() {
        let home = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        write(
            &home.path().join("config.toml"),
            "[github]\nproxy_root = \"https://proxy.example.com/api\"\n[packages]\nbanned_orgs = [\"evil\"]",
        );
        write(
            &ws.path().join(".ghpkg/config.toml"),
            "[github]\nproxy_root = \"https://attacker.example.com\"\n[packages]\nbanned_orgs = [\"worse\"]\n[target]\nid = \"esp32\"",
        );

        let resolved = load_with_env(Some(ws.path()), Some(home.path()), &HashMap::new()).unwrap();
        let config = &resolved.config;

        assert_eq!(
            config.github.proxy_root.as_deref(),
            Some("https://proxy.example.com/api")
        );
        assert!(config.packages.banned_orgs.contains(&"evil".to_owned()));
        assert!(config.packages.banned_orgs.contains(&"worse".to_owned()));
        assert_eq!(config.target.id, "esp32");
        assert_eq!(resolved.loaded_files.len(), 2);
        assert_eq!(
            resolved.field_sources.get("target.id"),
            Some(&ConfigLayer::Workspace)
        );
    }

    #[test]
    fn test_env_fills_unset_token() {
        let home = tempfile::tempdir().unwrap();
        let resolved = load_with_env(
            None,
            Some(home.path()),
            &env(&[("GITHUB_TOKEN", "ghp_env"), ("GHPKG_LOG_LEVEL", "debug")]),
        )
        .unwrap();

        assert_eq!(resolved.config.github.token.as_deref(), Some("ghp_env"));
        assert_eq!(resolved.config.logging.level, "debug");
        assert_eq!(
            resolved.field_sources.get("github.token"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_user_file_beats_env() {
        let home = tempfile::tempdir().unwrap();
        write(&home.path().join("config.toml"), "[github]\ntoken = \"ghp_file\"");
        let resolved = load_with_env(
            None,
            Some(home.path()),
            &env(&[("GITHUB_TOKEN", "ghp_env")]),
        )
        .unwrap();

        assert_eq!(resolved.config.github.token.as_deref(), Some("ghp_file"));
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let home = tempfile::tempdir().unwrap();
        write(&home.path().join("config.toml"), "[github]\ntimeout_secs = 0");
        let result = load_with_env(None, Some(home.path()), &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let home = tempfile::tempdir().unwrap();
        write(&home.path().join("config.toml"), "[github\n");
        let result = load_with_env(None, Some(home.path()), &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_file_single() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghpkg.toml");
        write(&path, "[target]\nid = \"rp2040\"");
        let config = load_file(&path).unwrap();
        assert_eq!(config.target.id, "rp2040");
        assert_eq!(config.github.raw_root, "https://raw.githubusercontent.com");
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.toml");
        let data = "x = \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&file_path, data).unwrap();

        let result = try_load_file(&file_path);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }
}
