//! Source-annotated display for `config show`.
//!
//! Prints the resolved configuration with annotations showing which layer
//! (defaults, user, workspace, environment) set each value.

use std::fmt::{self, Write as _};

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded (in precedence order).
    pub loaded_files: Vec<String>,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing source.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Render the resolved config, optionally limited to one section.
    ///
    /// The GitHub token is never part of the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or `section` does not exist.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Toml => self.show_toml(section),
            ShowFormat::Json => self.show_json(section),
        }
    }

    fn section_value(&self, section_name: &str) -> Result<toml::Value, fmt::Error> {
        let val = toml::Value::try_from(&self.config).map_err(|_| fmt::Error)?;
        val.as_table()
            .and_then(|t| t.get(section_name))
            .cloned()
            .ok_or(fmt::Error)
    }

    fn show_toml(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        let toml_str = match section {
            Some(name) => toml::to_string_pretty(&self.section_value(name)?),
            None => toml::to_string_pretty(&self.config),
        }
        .map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved ghpkg configuration\n");
        output.push_str("# Source annotations: [defaults] [user] [workspace] [env]\n");

        if self.config.github.token.is_some() {
            let source = self
                .field_sources
                .get("github.token")
                .map_or_else(String::new, |layer| format!(" ({layer})"));
            writeln!(output, "# github.token: set{source}, not shown")?;
        }

        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (in precedence order):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');

        // Section headers reset the dotted prefix as we walk the output.
        let mut prefix = section.unwrap_or("").to_owned();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                prefix = match section {
                    Some(s) => format!("{s}.{header}"),
                    None => header.to_owned(),
                };
            }
            match self.annotate_line(trimmed, &prefix) {
                Some(annotation) => writeln!(output, "{line}  # {annotation}")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    fn show_json(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        match section {
            Some(name) => serde_json::to_string_pretty(&self.section_value(name)?),
            None => serde_json::to_string_pretty(&self.config),
        }
        .map_err(|_| fmt::Error)
    }

    /// Source annotation for a `key = value` line.
    fn annotate_line(&self, trimmed: &str, prefix: &str) -> Option<String> {
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let (key, _) = trimmed.split_once('=')?;
        let key = key.trim();
        let field_path = if prefix.is_empty() {
            key.to_owned()
        } else {
            format!("{prefix}.{key}")
        };

        self.field_sources
            .get(&field_path)
            .map(|layer| format!("[{}]", layer_tag(layer)))
    }
}

fn layer_tag(layer: &crate::merge::ConfigLayer) -> &'static str {
    use crate::merge::ConfigLayer;
    match layer {
        ConfigLayer::Defaults => "defaults",
        ConfigLayer::User => "user",
        ConfigLayer::Workspace => "workspace",
        ConfigLayer::Environment => "env",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConfigLayer;

    fn resolved() -> ResolvedConfig {
        let mut field_sources = FieldSources::new();
        field_sources.insert("github.api_root".to_owned(), ConfigLayer::Defaults);
        field_sources.insert("target.id".to_owned(), ConfigLayer::Workspace);
        ResolvedConfig {
            config: Config::default(),
            field_sources,
            loaded_files: vec!["/ws/.ghpkg/config.toml".to_owned()],
        }
    }

    #[test]
    fn test_show_toml_annotates_sources() {
        let output = resolved().show(ShowFormat::Toml, None).unwrap();
        assert!(output.contains("Resolved ghpkg configuration"));
        assert!(output.contains("1. /ws/.ghpkg/config.toml"));

        let id_line = output
            .lines()
            .find(|l| l.starts_with("id ="))
            .unwrap();
        assert!(id_line.ends_with("# [workspace]"));
    }

    #[test]
    fn test_show_json_is_valid() {
        let output = resolved().show(ShowFormat::Json, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["target"]["id"], "core");
    }

    #[test]
    fn test_show_section() {
        let output = resolved().show(ShowFormat::Toml, Some("github")).unwrap();
        assert!(output.contains("api_root"));
        assert!(!output.contains("manifest_name"));
    }

    #[test]
    fn test_unknown_section_errors() {
        assert!(resolved().show(ShowFormat::Json, Some("nope")).is_err());
    }

    #[test]
    fn test_token_never_shown() {
        let mut r = resolved();
        r.config.github.token = Some("ghp_secret".to_owned());
        r.field_sources
            .insert("github.token".to_owned(), ConfigLayer::Environment);

        let toml_out = r.show(ShowFormat::Toml, None).unwrap();
        assert!(!toml_out.contains("ghp_secret"));
        assert!(toml_out.contains("github.token: set (environment variable), not shown"));

        let json_out = r.show(ShowFormat::Json, None).unwrap();
        assert!(!json_out.contains("ghp_secret"));
    }
}
