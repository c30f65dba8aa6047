#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for ghpkg.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ghpkg_config::Config;
//!
//! // defaults → user → workspace → env
//! let resolved = Config::load(Some(std::path::Path::new("."))).unwrap();
//! println!("API root: {}", resolved.config.github.api_root);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Workspace** (`{workspace}/.ghpkg/config.toml`): cannot redirect
//!    endpoints or supply a token, and can only add to the ban lists
//! 2. **User** (`~/.ghpkg/config.toml`, or `$GHPKG_HOME/config.toml`)
//! 3. **Environment variables** (`GHPKG_*`, `GITHUB_TOKEN`): fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! # Design
//!
//! This crate has **no dependencies on other ghpkg crates**. Conversion into
//! client settings, policy and logging configuration happens in the CLI.

pub mod env;
pub mod error;
pub mod loader;
pub mod merge;
pub mod show;
pub mod types;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Resolve defaults, `~/.ghpkg`, the workspace's `.ghpkg` and the
    /// environment into one validated config. See [`loader::load`].
    ///
    /// # Errors
    ///
    /// A malformed layer, an unusable env fallback, or a failed check.
    pub fn load(workspace_root: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, None)
    }

    /// Like [`Config::load`], reading the user layer from `home_dir` instead
    /// of `~/.ghpkg`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with_home(
        workspace_root: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, Some(home_dir))
    }

    /// One file on its own, without defaults or env fallbacks.
    ///
    /// # Errors
    ///
    /// The file is missing, unreadable, malformed, or fails validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
