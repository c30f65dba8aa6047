//! Organization and repository allow/deny policy.
//!
//! Precedence is a fixed rule table evaluated top to bottom, first match wins:
//! banned org, banned repo, approved org, approved repo. Anything unmatched is
//! [`RepoStatus::Unknown`].

use serde::{Deserialize, Serialize};

use crate::identifier::RepoIdentifier;

/// Policy verdict for a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoStatus {
    /// Neither approved nor banned, or no policy was available.
    #[default]
    Unknown,
    /// Explicitly approved by org or repo.
    Approved,
    /// Explicitly banned, or not evaluable as a repository.
    Banned,
}

impl std::fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Approved => write!(f, "approved"),
            Self::Banned => write!(f, "banned"),
        }
    }
}

/// Allow and deny lists for package repositories.
///
/// Accepts both snake_case keys and the camelCase keys used in package
/// configuration JSON (`bannedOrgs`, `allowUnapproved`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Organizations whose repositories are never fetched.
    #[serde(alias = "bannedOrgs")]
    pub banned_orgs: Vec<String>,
    /// Individual `owner/repo` names that are never fetched.
    #[serde(alias = "bannedRepos")]
    pub banned_repos: Vec<String>,
    /// Organizations whose repositories are approved.
    #[serde(alias = "approvedOrgs")]
    pub approved_orgs: Vec<String>,
    /// Individual approved `owner/repo` names.
    #[serde(alias = "approvedRepos")]
    pub approved_repos: Vec<String>,
    /// Whether free-text search may surface unapproved repositories.
    #[serde(alias = "allowUnapproved")]
    pub allow_unapproved: bool,
}

#[derive(Clone, Copy)]
enum Subject {
    Org,
    Repo,
}

struct Rule {
    verdict: RepoStatus,
    subject: Subject,
    entries: fn(&PolicyConfig) -> &[String],
}

const RULES: [Rule; 4] = [
    Rule {
        verdict: RepoStatus::Banned,
        subject: Subject::Org,
        entries: |c| c.banned_orgs.as_slice(),
    },
    Rule {
        verdict: RepoStatus::Banned,
        subject: Subject::Repo,
        entries: |c| c.banned_repos.as_slice(),
    },
    Rule {
        verdict: RepoStatus::Approved,
        subject: Subject::Org,
        entries: |c| c.approved_orgs.as_slice(),
    },
    Rule {
        verdict: RepoStatus::Approved,
        subject: Subject::Repo,
        entries: |c| c.approved_repos.as_slice(),
    },
];

impl Rule {
    fn matches(&self, config: &PolicyConfig, owner: &str, full_name: &str) -> bool {
        let value = match self.subject {
            Subject::Org => owner,
            Subject::Repo => full_name,
        };
        (self.entries)(config)
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(value))
    }
}

impl PolicyConfig {
    /// Classify an identifier against this policy.
    ///
    /// Ownerless identifiers are [`RepoStatus::Banned`].
    #[must_use]
    pub fn classify(&self, identifier: &RepoIdentifier) -> RepoStatus {
        let Some(owner) = identifier.owner.as_deref().filter(|o| !o.is_empty()) else {
            return RepoStatus::Banned;
        };
        RULES
            .iter()
            .find(|rule| rule.matches(self, owner, &identifier.full_name))
            .map_or(RepoStatus::Unknown, |rule| rule.verdict)
    }

    /// Whether the identifier is banned.
    #[must_use]
    pub fn is_banned(&self, identifier: &RepoIdentifier) -> bool {
        self.classify(identifier) == RepoStatus::Banned
    }

    /// Whether the identifier is approved.
    #[must_use]
    pub fn is_approved(&self, identifier: &RepoIdentifier) -> bool {
        self.classify(identifier) == RepoStatus::Approved
    }

    /// Whether free-text search may show a repository with this status.
    #[must_use]
    pub fn admits_in_search(&self, status: RepoStatus) -> bool {
        match status {
            RepoStatus::Approved => true,
            RepoStatus::Unknown => self.allow_unapproved,
            RepoStatus::Banned => false,
        }
    }
}

/// Classify a possibly-missing identifier under a possibly-missing policy.
///
/// Without a policy nothing can be decided, so the result is
/// [`RepoStatus::Unknown`]. Without an identifier the result is
/// [`RepoStatus::Banned`].
#[must_use]
pub fn classify(identifier: Option<&RepoIdentifier>, config: Option<&PolicyConfig>) -> RepoStatus {
    let Some(config) = config else {
        return RepoStatus::Unknown;
    };
    identifier.map_or(RepoStatus::Banned, |id| config.classify(id))
}

/// Alias of [`classify`] under the name UI layers look for.
#[must_use]
pub fn repo_status(identifier: Option<&RepoIdentifier>, config: Option<&PolicyConfig>) -> RepoStatus {
    classify(identifier, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RepoIdentifier {
        RepoIdentifier::parse(s).unwrap()
    }

    fn policy() -> PolicyConfig {
        PolicyConfig {
            banned_orgs: vec!["EvilCorp".into()],
            banned_repos: vec!["good-org/bad-repo".into()],
            approved_orgs: vec!["good-org".into()],
            approved_repos: vec!["someone/Nice-Repo".into()],
            allow_unapproved: false,
        }
    }

    #[test]
    fn no_config_is_unknown() {
        assert_eq!(classify(Some(&id("evilcorp/x")), None), RepoStatus::Unknown);
        assert_eq!(classify(None, None), RepoStatus::Unknown);
    }

    #[test]
    fn missing_or_ownerless_is_banned() {
        let p = policy();
        assert_eq!(classify(None, Some(&p)), RepoStatus::Banned);
        let ownerless = RepoIdentifier {
            owner: None,
            full_name: "nothing".into(),
            tag: None,
        };
        assert_eq!(p.classify(&ownerless), RepoStatus::Banned);
    }

    #[test]
    fn banned_org_and_repo() {
        let p = policy();
        assert_eq!(p.classify(&id("evilcorp/anything")), RepoStatus::Banned);
        assert_eq!(p.classify(&id("Good-Org/Bad-Repo")), RepoStatus::Banned);
    }

    #[test]
    fn approved_org_and_repo() {
        let p = policy();
        assert_eq!(p.classify(&id("good-org/fine")), RepoStatus::Approved);
        assert_eq!(p.classify(&id("someone/nice-repo")), RepoStatus::Approved);
        assert_eq!(p.classify(&id("someone/other")), RepoStatus::Unknown);
    }

    #[test]
    fn ban_beats_approval() {
        let p = PolicyConfig {
            banned_orgs: vec!["acme".into()],
            banned_repos: vec!["other/tool".into()],
            approved_orgs: vec!["acme".into(), "other".into()],
            approved_repos: vec!["acme/widget".into(), "other/tool".into()],
            allow_unapproved: true,
        };
        assert_eq!(p.classify(&id("acme/widget")), RepoStatus::Banned);
        assert_eq!(p.classify(&id("other/tool")), RepoStatus::Banned);
        assert_eq!(p.classify(&id("other/lib")), RepoStatus::Approved);
    }

    #[test]
    fn search_admission() {
        let mut p = policy();
        assert!(p.admits_in_search(RepoStatus::Approved));
        assert!(!p.admits_in_search(RepoStatus::Unknown));
        p.allow_unapproved = true;
        assert!(p.admits_in_search(RepoStatus::Unknown));
        assert!(!p.admits_in_search(RepoStatus::Banned));
    }

    #[test]
    fn deserializes_camel_case_keys() {
        let p: PolicyConfig = serde_json::from_str(
            r#"{ "bannedOrgs": ["x"], "approvedRepos": ["a/b"], "allowUnapproved": true }"#,
        )
        .unwrap();
        assert_eq!(p.banned_orgs, vec!["x"]);
        assert_eq!(p.approved_repos, vec!["a/b"]);
        assert!(p.allow_unapproved);
        assert!(p.banned_repos.is_empty());
    }
}
