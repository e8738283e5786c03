//! Semantic-version collaborator
//!
//! Range grammar and satisfaction rules come from the `semver` crate. This
//! module only adapts request tokens to that crate's grammar:
//!
//! - a leading `v`/`V` or `=` on a version is ignored
//! - a comparator without an operator is an exact match, unless it has an
//!   `x`/`X`/`*` component, in which case it is an x-range
//! - `A - B` becomes `>=A, <=B`
//! - whitespace-separated comparators are intersected, `||` unions them
//! - build metadata in comparators is ignored

use crate::error::ConfigError;
use semver::{Version, VersionReq};

const OPERATORS: [&str; 7] = [">=", "<=", ">", "<", "=", "^", "~"];

/// Parse a concrete version, tolerating a leading `v`/`V` or `=`
pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
    Version::parse(strip_version_prefix(input.trim()))
}

fn strip_version_prefix(input: &str) -> &str {
    let input = input.strip_prefix('=').unwrap_or(input).trim_start();
    input
        .strip_prefix('v')
        .or_else(|| input.strip_prefix('V'))
        .unwrap_or(input)
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

/// Version body without prefix letter or build metadata, with x-range
/// components rewritten to `*`
fn bare(version: &str) -> (String, bool) {
    let version = strip_version_prefix(version);
    let version = version.split('+').next().unwrap_or_default();
    let mut wildcard = false;
    let parts: Vec<&str> = version
        .split('.')
        .map(|part| {
            if is_wildcard(part) {
                wildcard = true;
                "*"
            } else {
                part
            }
        })
        .collect();
    (parts.join("."), wildcard)
}

/// Bound of a hyphen range, truncated at the first wildcard component
fn hyphen_bound(version: &str) -> String {
    let (version, _) = bare(version);
    version
        .split('.')
        .take_while(|part| *part != "*")
        .collect::<Vec<_>>()
        .join(".")
}

fn split_hyphen(alternative: &str) -> Option<(&str, &str)> {
    let (low, high) = alternative.split_once(" - ")?;
    let (low, high) = (low.trim(), high.trim());
    let single = |s: &str| !s.is_empty() && !s.contains(char::is_whitespace);
    (single(low) && single(high)).then_some((low, high))
}

fn comparator(input: &str) -> Option<String> {
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|op| input.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", input));
    let (version, wildcard) = bare(rest);

    if version == "*" {
        return None;
    }
    if op.is_empty() && !wildcard {
        Some(format!("={version}"))
    } else {
        Some(format!("{op}{version}"))
    }
}

fn parse_alternative(alternative: &str) -> Result<VersionReq, semver::Error> {
    let alternative = alternative.trim();

    let comparators: Vec<String> = match split_hyphen(alternative) {
        Some((low, high)) => {
            let low = hyphen_bound(low);
            let high = hyphen_bound(high);
            let mut comparators = Vec::with_capacity(2);
            if !low.is_empty() {
                comparators.push(format!(">={low}"));
            }
            if !high.is_empty() {
                comparators.push(format!("<={high}"));
            }
            comparators
        }
        None => alternative
            .split_whitespace()
            .filter_map(comparator)
            .collect(),
    };

    if comparators.is_empty() {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(&comparators.join(", "))
}

/// A parsed range expression: a union of comparator sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parse a range expression such as `^v1.0.0`, `1.0.x` or `v1 - v2.0.0`
    pub fn parse(input: &str) -> Result<Self, semver::Error> {
        let alternatives = input
            .split("||")
            .map(parse_alternative)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    /// Check whether a concrete version satisfies this range
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// The set of concrete versions an application declares it supports
///
/// Entries keep their original spelling (`v1.1.0`) so that resolution hands
/// back exactly what was declared.
#[derive(Debug, Clone)]
pub struct SupportedVersions {
    entries: Vec<(Version, String)>,
}

impl SupportedVersions {
    /// Parse the declared versions
    ///
    /// Fails if the collection is empty or an entry is not a valid semantic
    /// version.
    pub fn new<I, S>(versions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = versions
            .into_iter()
            .map(|original| {
                let original = original.into();
                parse_version(&original)
                    .map(|version| (version, original.clone()))
                    .map_err(|err| ConfigError::InvalidSupportedVersion {
                        version: original,
                        reason: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if entries.is_empty() {
            return Err(ConfigError::NoSupportedVersions);
        }
        Ok(Self { entries })
    }

    /// Number of declared versions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; an empty set cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared versions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, original)| original.as_str())
    }

    /// The highest declared version satisfying `range`
    pub fn max_satisfying(&self, range: &VersionRange) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(version, _)| range.matches(version))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, original)| original.as_str())
    }
}
