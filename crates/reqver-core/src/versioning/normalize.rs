//! Best-effort coercion of partial version tokens

use super::range::parse_version;
use std::borrow::Cow;

/// Coerce a matched token into something the range parser accepts
///
/// A token that already is a valid semantic version is returned unchanged.
/// Otherwise it is split on `.`, the first segment is kept as the major
/// part and missing minor/patch segments default to `0`:
///
/// - `v1` becomes `v1.0.0`
/// - `1.2` becomes `1.2.0`
/// - `v1 - v2` becomes `v1 - v2.0.0`
/// - `^v1.0.0` and `v1.0.x` are returned as they were
///
/// Segments past the third are dropped. Malformed prerelease or build
/// suffixes are not repaired.
pub fn normalize(token: &str) -> Cow<'_, str> {
    if parse_version(token).is_ok() {
        return Cow::Borrowed(token);
    }

    let mut parts = token.split('.');
    let major = parts.next().unwrap_or_default();
    let minor = parts.next().unwrap_or("0");
    let patch = parts.next().unwrap_or("0");

    let normalized = format!("{major}.{minor}.{patch}");
    if normalized == token {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(normalized)
    }
}
