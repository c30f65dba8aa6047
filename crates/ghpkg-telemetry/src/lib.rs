//! Logging for ghpkg.
//!
//! Every crate in the workspace logs through `tracing`; this crate installs
//! the subscriber once, at startup, from a [`LogConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ghpkg_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), ghpkg_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("ghpkg_core=debug");
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
