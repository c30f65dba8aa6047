//! Environment variable fallback and `${VAR}` reference resolution.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set. A value that came from the embedded defaults still counts
//! as unset.

use std::collections::HashMap;
use std::fmt::Write as _;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, set_nested};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// Supported env vars. Earlier entries win when two map to the same field.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "GHPKG_GITHUB_TOKEN",
        field_path: "github.token",
    },
    EnvMapping {
        var_name: "GITHUB_TOKEN",
        field_path: "github.token",
    },
    EnvMapping {
        var_name: "GHPKG_API_ROOT",
        field_path: "github.api_root",
    },
    EnvMapping {
        var_name: "GHPKG_PROXY_ROOT",
        field_path: "github.proxy_root",
    },
    EnvMapping {
        var_name: "GHPKG_NO_GITHUB_PROXY",
        field_path: "github.no_github_proxy",
    },
    EnvMapping {
        var_name: "GHPKG_TIMEOUT_SECS",
        field_path: "github.timeout_secs",
    },
    EnvMapping {
        var_name: "GHPKG_TARGET",
        field_path: "target.id",
    },
    EnvMapping {
        var_name: "GHPKG_CACHE_DIR",
        field_path: "cache.directory",
    },
    EnvMapping {
        var_name: "GHPKG_LOG_LEVEL",
        field_path: "logging.level",
    },
];

/// Apply environment variable fallbacks to fields that were **not** set by
/// any config file layer.
///
/// Returns the number of env vars applied.
///
/// # Errors
///
/// [`ConfigError::EnvError`] when a numeric or boolean field gets a value it
/// cannot parse.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults)
        {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name).filter(|v| !v.is_empty()) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            let value = coerce_to_toml_value(mapping.field_path, val).map_err(|expected| {
                ConfigError::EnvError {
                    var: mapping.var_name.to_owned(),
                    value: val.clone(),
                    field: mapping.field_path.to_owned(),
                    expected,
                }
            })?;
            let segments: Vec<&str> = mapping.field_path.split('.').collect();
            set_nested(merged, &segments, value);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    Ok(count)
}

/// Resolve `${VAR}` references in the workspace layer, restricted to
/// `GHPKG_*` variables so a checked-out project cannot read arbitrary
/// secrets into its config.
pub fn resolve_env_references_restricted<S: ::std::hash::BuildHasher>(
    val: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) {
    let restricted: HashMap<String, String> = env_vars
        .iter()
        .filter(|(k, _)| k.starts_with("GHPKG_"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    resolve_env_references(val, &restricted);
}

/// Resolve `${VAR}` references within string values in the config tree.
///
/// References that don't resolve are left as-is.
pub fn resolve_env_references<S: ::std::hash::BuildHasher>(
    val: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) {
    match val {
        toml::Value::String(s) => {
            *s = resolve_string_refs(s, env_vars);
        },
        toml::Value::Table(table) => {
            for (_, child) in table.iter_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        toml::Value::Array(arr) => {
            for child in arr.iter_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        _ => {},
    }
}

fn resolve_string_refs<S: ::std::hash::BuildHasher>(
    input: &str,
    env_vars: &HashMap<String, String, S>,
) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut var_name = String::new();
        let mut closed = false;
        for ch in chars.by_ref() {
            if ch == '}' {
                closed = true;
                break;
            }
            var_name.push(ch);
        }

        if !closed || var_name.is_empty() {
            result.push_str("${");
            result.push_str(&var_name);
            if closed {
                result.push('}');
            }
            continue;
        }

        if let Some(val) = env_vars.get(&var_name) {
            result.push_str(val);
        } else {
            debug!(var = var_name, "unresolved env var reference in config");
            let _ = write!(result, "${{{var_name}}}");
        }
    }

    result
}

/// Coerce a string env var value to the TOML type of the field it fills.
fn coerce_to_toml_value(path: &str, val: &str) -> Result<toml::Value, &'static str> {
    match path {
        "github.timeout_secs" | "github.connect_timeout_secs" => val
            .trim()
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|_| "a whole number of seconds"),
        "github.no_github_proxy" | "cache.enabled" => {
            match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Ok(toml::Value::Boolean(true)),
                "0" | "false" | "no" => Ok(toml::Value::Boolean(false)),
                _ => Err("one of 1/true/yes or 0/false/no"),
            }
        },
        _ => Ok(toml::Value::String(val.to_owned())),
    }
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
