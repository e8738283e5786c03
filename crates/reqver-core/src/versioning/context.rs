//! Per-request version context

/// Version information attached to a request by a resolution stage
///
/// `original_version` is the token exactly as matched (after percent
/// decoding). `version` is either that same token echoed back, or the
/// supported version a range resolved to. It is `None` when a token matched
/// but nothing in the supported set satisfied it.
///
/// Downstream stages only read this value; it is written by
/// [`VersionLayer`](super::VersionLayer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionContext {
    original_version: Option<String>,
    version: Option<String>,
}

impl VersionContext {
    pub(crate) fn matched(original: impl Into<String>, version: Option<String>) -> Self {
        Self {
            original_version: Some(original.into()),
            version,
        }
    }

    /// The raw token as it appeared in the request
    pub fn original_version(&self) -> Option<&str> {
        self.original_version.as_deref()
    }

    /// The resolved version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
