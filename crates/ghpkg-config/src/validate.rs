//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges before any client is built from them.

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound for both HTTP timeouts, in seconds.
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_github(config)?;
    validate_packages(config)?;
    validate_target(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

/// Endpoints must be `https`, or plain `http` on a loopback host.
fn validate_endpoint(field: &str, raw: &str) -> ConfigResult<()> {
    let url = Url::parse(raw).map_err(|e| invalid(field, format!("invalid URL '{raw}': {e}")))?;

    match url.scheme() {
        "https" => {},
        "http" => {
            let loopback = match url.host() {
                Some(url::Host::Domain(d)) => d == "localhost",
                Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
                Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
                None => false,
            };
            if !loopback {
                return Err(invalid(
                    field,
                    format!("'{raw}' uses plain http; only loopback hosts may skip TLS"),
                ));
            }
        },
        other => {
            return Err(invalid(field, format!("unsupported URL scheme '{other}'")));
        },
    }

    if url.host().is_none() {
        return Err(invalid(field, format!("'{raw}' has no host")));
    }
    Ok(())
}

fn validate_github(config: &Config) -> ConfigResult<()> {
    let g = &config.github;

    validate_endpoint("github.api_root", &g.api_root)?;
    validate_endpoint("github.raw_root", &g.raw_root)?;
    if let Some(proxy) = g.proxy_root.as_deref().filter(|p| !p.is_empty()) {
        validate_endpoint("github.proxy_root", proxy)?;
    }

    if g.user_agent.trim().is_empty() {
        return Err(invalid("github.user_agent", "user_agent must not be empty"));
    }

    for (field, value) in [
        ("github.timeout_secs", g.timeout_secs),
        ("github.connect_timeout_secs", g.connect_timeout_secs),
    ] {
        if value == 0 || value > MAX_TIMEOUT_SECS {
            return Err(invalid(
                field,
                format!("{value} is out of range; must be between 1 and {MAX_TIMEOUT_SECS}"),
            ));
        }
    }

    Ok(())
}

fn validate_packages(config: &Config) -> ConfigResult<()> {
    let p = &config.packages;

    for (field, orgs) in [
        ("packages.banned_orgs", &p.banned_orgs),
        ("packages.approved_orgs", &p.approved_orgs),
    ] {
        if let Some(bad) = orgs.iter().find(|o| o.is_empty() || o.contains('/')) {
            return Err(invalid(
                field,
                format!("'{bad}' is not an organization name"),
            ));
        }
    }

    for (field, repos) in [
        ("packages.banned_repos", &p.banned_repos),
        ("packages.approved_repos", &p.approved_repos),
    ] {
        let malformed = repos.iter().find(|r| {
            !matches!(r.split_once('/'), Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/'))
        });
        if let Some(bad) = malformed {
            return Err(invalid(field, format!("'{bad}' is not in owner/repo form")));
        }
    }

    Ok(())
}

fn validate_target(config: &Config) -> ConfigResult<()> {
    let t = &config.target;

    if t.id.trim().is_empty() {
        return Err(invalid("target.id", "target id must not be empty"));
    }
    if t.search_marker.trim().is_empty() {
        return Err(invalid("target.search_marker", "search_marker must not be empty"));
    }

    let name = t.manifest_name.as_str();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(invalid(
            "target.manifest_name",
            format!("'{name}' must be a plain file name"),
        ));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}
