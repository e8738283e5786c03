//! Range resolution against the supported version set

use super::normalize::normalize;
use super::range::{parse_version, SupportedVersions, VersionRange};
use crate::error::{ApiError, ConfigError};

/// Default message for a refused prerelease lock
pub const DEFAULT_PRERELEASE_MESSAGE: &str = "Requests may not lock to a prerelease version.";

/// Whether `token` pins an exact prerelease (`v1.0.0-alpha.1`) rather than
/// expressing one through a range (`^v1.0.0-alpha.1`)
pub fn is_prerelease_lock(token: &str) -> bool {
    parse_version(token)
        .map(|version| !version.pre.is_empty())
        .unwrap_or(false)
}

/// Whether `token` is a version with only one or two numeric groups, such
/// as `v1`, `^1.2` or `=v3.0`
fn is_partial_version(token: &str) -> bool {
    let rest = token.strip_prefix(['=', '^', '~']).unwrap_or(token);
    let rest = match rest.chars().next() {
        Some(letter) if letter.is_ascii_alphabetic() => &rest[letter.len_utf8()..],
        _ => rest,
    };
    let groups: Vec<&str> = rest.split('.').collect();
    groups.len() <= 2
        && groups
            .iter()
            .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()))
}

/// Selects the highest supported version satisfying a requested range
///
/// Built once with the supported versions and shared read-only across
/// requests.
#[derive(Debug, Clone)]
pub struct RangeResolver {
    supported: SupportedVersions,
    lock_prerelease: bool,
    prerelease_message: String,
}

impl RangeResolver {
    /// Create a resolver over the given supported versions
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSupportedVersions`] if `supported` is empty, and
    /// [`ConfigError::InvalidSupportedVersion`] for an entry that is not a
    /// semantic version.
    pub fn new<I, S>(supported: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let supported = SupportedVersions::new(supported)?;
        tracing::debug!(count = supported.len(), "range resolver configured");
        Ok(Self {
            supported,
            lock_prerelease: false,
            prerelease_message: DEFAULT_PRERELEASE_MESSAGE.to_string(),
        })
    }

    /// Refuse tokens that pin an exact prerelease version
    pub fn lock_prerelease(mut self, enabled: bool) -> Self {
        self.lock_prerelease = enabled;
        self
    }

    /// Message used when a prerelease lock is refused
    pub fn with_prerelease_message(mut self, message: impl Into<String>) -> Self {
        self.prerelease_message = message.into();
        self
    }

    /// The supported version set
    pub fn supported(&self) -> &SupportedVersions {
        &self.supported
    }

    /// Whether prerelease locks are refused
    pub fn locks_prerelease(&self) -> bool {
        self.lock_prerelease
    }

    /// Resolve a raw token
    ///
    /// Returns `Ok(None)` when the token does not parse as a range or no
    /// supported version satisfies it; rejecting that case is left to a
    /// later validation stage.
    ///
    /// # Errors
    ///
    /// A 400 [`ApiError`] when prerelease locking is refused and the token
    /// pins an exact prerelease.
    pub fn resolve(&self, token: &str) -> Result<Option<String>, ApiError> {
        if self.lock_prerelease && is_prerelease_lock(token) {
            return Err(ApiError::bad_request(self.prerelease_message.clone())
                .with_internal(format!("prerelease lock `{token}`")));
        }

        // A bare partial version is padded first so `v1` means exactly
        // `v1.0.0`. Everything else is parsed as written and only padded if
        // that fails.
        let parsed = if is_partial_version(token) {
            VersionRange::parse(&normalize(token))
        } else {
            VersionRange::parse(token).or_else(|_| VersionRange::parse(&normalize(token)))
        };
        let range = match parsed {
            Ok(range) => range,
            Err(err) => {
                tracing::debug!(token = %token, error = %err, "version token is not a range");
                return Ok(None);
            }
        };

        Ok(self.supported.max_satisfying(&range).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn resolver() -> RangeResolver {
        RangeResolver::new(["v1.0.0", "v1.0.1", "v1.1.0", "v1.1.1"]).unwrap()
    }

    fn resolve(token: &str) -> Option<String> {
        resolver().resolve(token).unwrap()
    }

    #[test]
    fn test_requires_supported_versions() {
        assert!(matches!(
            RangeResolver::new(Vec::<&str>::new()),
            Err(ConfigError::NoSupportedVersions)
        ));
    }

    #[test]
    fn test_partial_tokens_resolve_exactly() {
        assert_eq!(resolve("v1"), Some("v1.0.0".into()));
        assert_eq!(resolve("v1.1"), Some("v1.1.0".into()));
        assert_eq!(resolve("v1.1.1"), Some("v1.1.1".into()));
    }

    #[test]
    fn test_range_tokens() {
        assert_eq!(resolve("v1 - v2"), Some("v1.1.1".into()));
        assert_eq!(resolve("v1.0.0 - v1.0.1"), Some("v1.0.1".into()));
        assert_eq!(resolve(">=v1.0.1 <v1.1.0"), Some("v1.0.1".into()));
        assert_eq!(resolve("v1.0.x"), Some("v1.0.1".into()));
        assert_eq!(resolve("~v1.0.0"), Some("v1.0.1".into()));
        assert_eq!(resolve("^v1.0.0"), Some("v1.1.1".into()));
    }

    #[test]
    fn test_x_range_tokens_are_not_padded() {
        assert_eq!(resolve("v1.x"), Some("v1.1.1".into()));
        assert_eq!(resolve("v1.*"), Some("v1.1.1".into()));
        assert_eq!(resolve("1.X"), Some("v1.1.1".into()));
    }

    #[test]
    fn test_union_tokens_keep_exact_alternatives() {
        let resolver = RangeResolver::new(["v1.0.0", "v2.0.0", "v2.1.0"]).unwrap();
        assert_eq!(resolver.resolve("1.0.0||2.0.0").unwrap(), Some("v2.0.0".into()));
        assert_eq!(resolver.resolve("v1.0.0||v2.0.0").unwrap(), Some("v2.0.0".into()));
    }

    #[test]
    fn test_is_partial_version() {
        assert!(is_partial_version("v1"));
        assert!(is_partial_version("1.2"));
        assert!(is_partial_version("^v1"));
        assert!(is_partial_version("=r3.0"));
        assert!(!is_partial_version("v1.0.0"));
        assert!(!is_partial_version("v1.x"));
        assert!(!is_partial_version("v1.*"));
        assert!(!is_partial_version("1||2"));
        assert!(!is_partial_version("v1 - v2"));
        assert!(!is_partial_version("v"));
    }

    #[test]
    fn test_unsatisfied_or_unparseable_is_none() {
        assert_eq!(resolve("v2"), None);
        assert_eq!(resolve("^v3.0.0"), None);
        assert_eq!(resolve("v1.0.0-rc foo"), None);
    }

    #[test]
    fn test_prerelease_allowed_by_default() {
        let resolver = RangeResolver::new(["v1.0.0-alpha.1"]).unwrap();
        assert_eq!(
            resolver.resolve("v1.0.0-alpha.1").unwrap(),
            Some("v1.0.0-alpha.1".into())
        );
    }

    #[test]
    fn test_prerelease_lock_prevented() {
        let resolver = RangeResolver::new(["v1.0.0-alpha.1"])
            .unwrap()
            .lock_prerelease(true);

        let err = resolver.resolve("v1.0.0-alpha.1").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, DEFAULT_PRERELEASE_MESSAGE);

        // Ranges over prereleases are still resolved
        assert_eq!(
            resolver.resolve("^v1.0.0-alpha.0").unwrap(),
            Some("v1.0.0-alpha.1".into())
        );
    }

    #[test]
    fn test_prerelease_message_configurable() {
        let resolver = RangeResolver::new(["v1.0.0-beta"])
            .unwrap()
            .lock_prerelease(true)
            .with_prerelease_message("No betas");

        assert_eq!(resolver.resolve("v1.0.0-beta").unwrap_err().message, "No betas");
    }

    #[test]
    fn test_is_prerelease_lock() {
        assert!(is_prerelease_lock("v1.0.0-alpha.1"));
        assert!(is_prerelease_lock("1.0.0-rc.1+build"));
        assert!(!is_prerelease_lock("v1.0.0"));
        assert!(!is_prerelease_lock("^v1.0.0-alpha.1"));
        assert!(!is_prerelease_lock("~v1.0.0-alpha.1"));
        assert!(!is_prerelease_lock("v1"));
    }
}
