//! Version-aware ordering of ref names.
//!
//! A name splits into `base[-pre][+build]`. The base is broken into
//! alternating digit and non-digit runs; digit runs compare numerically,
//! other runs as strings. Between equal bases a release sorts after any
//! pre-release (`v1.0.0-rc1` < `v1.0.0`), pre-releases that are valid semver
//! pre-release identifiers order the semver way (`rc.2` < `rc.10`), and build
//! metadata sorts last (`v1.0.0` < `v1.0.0+build5`). Names that tie on all of
//! that fall back to byte order, so the result is a total order.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
enum Run<'a> {
    Digits(&'a str),
    Text(&'a str),
}

impl Ord for Run<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Run::Digits(x), Run::Digits(y)) => cmp_digits(x, y),
            (Run::Text(x), Run::Text(y)) => x.cmp(y),
            (Run::Digits(_), Run::Text(_)) => Ordering::Less,
            (Run::Text(_), Run::Digits(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Run<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Run<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Run<'_> {}

/// Pre-release suffix. Semver-shaped suffixes sort before free-form ones.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Pre<'a> {
    Semver(semver::Prerelease),
    Other(Vec<Run<'a>>),
}

impl<'a> Pre<'a> {
    fn parse(text: &'a str) -> Self {
        match semver::Prerelease::new(text) {
            Ok(pre) if !text.is_empty() => Self::Semver(pre),
            _ => Self::Other(runs(text)),
        }
    }
}

struct VersionKey<'a> {
    base: Vec<Run<'a>>,
    pre: Option<Pre<'a>>,
    build: Vec<Run<'a>>,
}

impl<'a> VersionKey<'a> {
    fn new(name: &'a str) -> Self {
        let (core, build) = name.split_once('+').unwrap_or((name, ""));
        let (base, pre) = match core.split_once('-') {
            Some((base, pre)) => (base, Some(Pre::parse(pre))),
            None => (core, None),
        };
        Self {
            base: runs(base),
            pre,
            build: runs(build),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => x.cmp(y),
            })
            .then_with(|| self.build.cmp(&other.build))
    }
}

fn runs(s: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut digits: Option<bool> = None;
    for (idx, ch) in s.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match digits {
            Some(prev) if prev != is_digit => {
                out.push(make_run(&s[start..idx], prev));
                start = idx;
            },
            _ => {},
        }
        digits = Some(is_digit);
    }
    if let Some(prev) = digits {
        out.push(make_run(&s[start..], prev));
    }
    out
}

fn make_run(text: &str, digits: bool) -> Run<'_> {
    if digits {
        Run::Digits(text)
    } else {
        Run::Text(text)
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare two ref names so numeric segments order numerically.
#[must_use]
pub fn version_cmp(a: &str, b: &str) -> Ordering {
    VersionKey::new(a)
        .compare(&VersionKey::new(b))
        .then_with(|| a.cmp(b))
}

/// Sort names in place by [`version_cmp`].
pub fn sort_versions(names: &mut [String]) {
    names.sort_by(|a, b| version_cmp(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = input.iter().map(ToString::to_string).collect();
        sort_versions(&mut v);
        v
    }

    fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
        if items.is_empty() {
            return vec![Vec::new()];
        }
        let mut out = Vec::new();
        for (i, first) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, *first);
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn numeric_segments_order_numerically() {
        assert_eq!(
            sorted(&["v2.0.0", "v10.0.0", "v1.0.0"]),
            vec!["v1.0.0", "v2.0.0", "v10.0.0"]
        );
        assert_eq!(version_cmp("v2.0", "v10.0"), Ordering::Less);
    }

    #[test]
    fn leading_zeros_are_ignored_for_magnitude() {
        assert_eq!(cmp_digits("007", "7"), Ordering::Equal);
        // equal by value, so the plain string order breaks the tie
        assert_eq!(version_cmp("v007", "v7"), Ordering::Less);
        assert_eq!(cmp_digits("010", "9"), Ordering::Greater);
    }

    #[test]
    fn prerelease_sorts_before_release() {
        assert_eq!(version_cmp("v1.0.0-rc1", "v1.0.0"), Ordering::Less);
        assert_eq!(version_cmp("v1.0.0", "v1.0.0-beta"), Ordering::Greater);
        assert_eq!(version_cmp("v1.0.0", "v1.0.0.1"), Ordering::Less);
        assert_eq!(version_cmp("v1.0.0-rc.2", "v1.0.0-rc.10"), Ordering::Less);
    }

    #[test]
    fn build_metadata_sorts_after_release() {
        assert_eq!(version_cmp("v1.0.0", "v1.0.0+build5"), Ordering::Less);
        assert_eq!(version_cmp("v1.0.0-rc1", "v1.0.0+build5"), Ordering::Less);
        assert_eq!(version_cmp("v1.0.0+build5", "v1.0.1-rc1"), Ordering::Less);
    }

    #[test]
    fn order_is_independent_of_input_order() {
        let tags = [
            "v1.0.0+build5",
            "v1.0.0",
            "v1.0.0-rc1",
            "v10.0.0",
            "v1.0.0-beta",
            "v0.9.0",
        ];
        let expected = vec![
            "v0.9.0",
            "v1.0.0-beta",
            "v1.0.0-rc1",
            "v1.0.0",
            "v1.0.0+build5",
            "v10.0.0",
        ];
        for perm in permutations(&tags) {
            assert_eq!(sorted(&perm), expected, "input order {perm:?}");
        }
    }

    #[test]
    fn mixed_names_sort_consistently() {
        let names = ["main", "release-2", "release-10", "release", "v1.2", "v1.2_hotfix"];
        let first = sorted(&names);
        for perm in permutations(&names) {
            assert_eq!(sorted(&perm), first, "input order {perm:?}");
        }
        for pair in first.windows(2) {
            assert_ne!(version_cmp(&pair[0], &pair[1]), Ordering::Greater);
            assert_ne!(version_cmp(&pair[1], &pair[0]), Ordering::Less);
        }
    }

    #[test]
    fn text_runs_compare_lexically() {
        assert_eq!(
            sorted(&["main", "feature", "develop"]),
            vec!["develop", "feature", "main"]
        );
    }

    #[test]
    fn identical_names_are_equal() {
        assert_eq!(version_cmp("v1.2.3", "v1.2.3"), Ordering::Equal);
        assert_eq!(version_cmp("", ""), Ordering::Equal);
        assert_eq!(version_cmp("", "v1"), Ordering::Less);
    }
}
