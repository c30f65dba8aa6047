//! Errors raised while loading or validating configuration.

use std::io;
use thiserror::Error;

/// Everything that can go wrong between reading a config file and handing
/// out a validated [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    ReadError {
        /// Offending file.
        path: String,
        /// I/O failure.
        #[source]
        source: io::Error,
    },

    /// A config file (or the merged result) is not valid TOML for [`Config`](crate::Config).
    #[error("invalid config in {path}: {source}")]
    ParseError {
        /// Offending file, or `<merged config>` for the combined layers.
        path: String,
        /// Decoder failure.
        #[source]
        source: toml::de::Error,
    },

    /// An environment fallback holds a value its field cannot take.
    #[error("{var}={value:?} cannot be used for {field}: expected {expected}")]
    EnvError {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
        /// Dotted field path it maps to.
        field: String,
        /// What the field accepts.
        expected: &'static str,
    },

    /// A field failed a semantic check.
    #[error("{field}: {message}")]
    ValidationError {
        /// Dotted field path.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// No home directory to look for `~/.ghpkg` in.
    #[error("no home directory found; set GHPKG_HOME")]
    NoHomeDir,
}

/// Result alias for this crate.
pub type ConfigResult<T> = Result<T, ConfigError>;
