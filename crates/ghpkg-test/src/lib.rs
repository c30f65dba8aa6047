//! ghpkg Test - Shared test utilities.
//!
//! This crate provides a scripted HTTP transport and GitHub payload fixtures
//! for use as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! ghpkg-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use ghpkg_test::{MockTransport, direct_client, repo_json, API_ROOT};
//!
//! #[tokio::test]
//! async fn looks_up_repo() {
//!     let mock = MockTransport::new()
//!         .with_get_json(format!("{API_ROOT}/repos/octo/hello"), repo_json("Octo/Hello", "hi", "main"));
//!     let client = direct_client(&mock);
//!     let repo = client.repo(&"octo/hello".parse().unwrap(), None).await.unwrap();
//!     assert!(repo.is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
