//! Terminal styling for command output.

use colored::{ColoredString, Colorize};
use ghpkg_core::RepoStatus;

/// Length of an abbreviated commit SHA.
const SHORT_SHA: usize = 12;

pub(crate) struct Theme;

impl Theme {
    fn marked(marker: ColoredString, text: impl std::fmt::Display) -> String {
        format!("{marker} {text}")
    }

    pub(crate) fn header(text: &str) -> String {
        text.bold().cyan().to_string()
    }

    pub(crate) fn success(text: &str) -> String {
        Self::marked("✓".green(), text)
    }

    pub(crate) fn error(text: &str) -> String {
        Self::marked("✗".red(), text.red())
    }

    pub(crate) fn warning(text: &str) -> String {
        Self::marked("!".yellow(), text.yellow())
    }

    pub(crate) fn info(text: &str) -> String {
        Self::marked("i".blue(), text)
    }

    pub(crate) fn dimmed(text: &str) -> String {
        text.dimmed().to_string()
    }

    /// `key: value` with the key in bold.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("{}: {value}", key.bold())
    }

    /// Policy verdict, colored by severity.
    pub(crate) fn status(status: RepoStatus) -> String {
        match status {
            RepoStatus::Approved => "approved".green().to_string(),
            RepoStatus::Unknown => "unknown".yellow().to_string(),
            RepoStatus::Banned => "banned".red().bold().to_string(),
        }
    }

    /// Abbreviated commit SHA. Shorter inputs (proxy tag names) pass through.
    pub(crate) fn sha(sha: &str) -> String {
        sha.get(..SHORT_SHA).unwrap_or(sha).cyan().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha_is_abbreviated() {
        colored::control::set_override(false);
        assert_eq!(
            Theme::sha("0123456789abcdef0123456789abcdef01234567"),
            "0123456789ab"
        );
        assert_eq!(Theme::sha("v1.2"), "v1.2");
        assert_eq!(Theme::status(RepoStatus::Banned), "banned");
    }
}
