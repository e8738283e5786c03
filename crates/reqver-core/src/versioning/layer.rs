//! Resolution middleware

use super::context::VersionContext;
use super::matcher::{TokenMatcher, TokenSource};
use super::resolver::RangeResolver;
use crate::error::{ApiError, ConfigError};
use crate::middleware::{BoxFuture, BoxedNext, MiddlewareLayer};
use crate::request::Request;
use crate::response::IntoResponse;
use std::sync::Arc;

/// Middleware that records the requested version on each request
///
/// Without a resolver the matched token is echoed as the version. With a
/// [`RangeResolver`] the token is treated as a range and the highest
/// satisfying supported version is recorded instead.
///
/// # Example
///
/// ```rust,ignore
/// // /api/^v1.0.0/users resolves to the newest supported 1.x
/// let layer = VersionLayer::by_semver_path(["v1.0.0", "v1.1.0"], "/api/")?;
/// ```
#[derive(Clone)]
pub struct VersionLayer {
    matcher: Arc<TokenMatcher>,
    resolver: Option<Arc<RangeResolver>>,
}

impl VersionLayer {
    /// Layer that echoes whatever token `matcher` finds
    pub fn new(matcher: TokenMatcher) -> Self {
        Self {
            matcher: Arc::new(matcher),
            resolver: None,
        }
    }

    /// Resolve matched tokens against supported versions
    pub fn with_resolver(mut self, resolver: RangeResolver) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Literal version from the path, e.g. `/v1/foo` with prefix `/`
    pub fn by_path(prefix: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self::new(TokenMatcher::path(prefix)?))
    }

    /// Range-resolved version from the path
    pub fn by_semver_path<I, S>(supported: I, prefix: impl Into<String>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resolver = RangeResolver::new(supported)?;
        let matcher = TokenMatcher::builder(TokenSource::path(prefix))
            .ranges(true)
            .build()?;
        Ok(Self::new(matcher).with_resolver(resolver))
    }

    /// Literal version from the `Accept` header
    pub fn by_accept(
        vendor: impl Into<String>,
        separator: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(TokenMatcher::accept(vendor, separator, suffix)?))
    }

    /// Range-resolved version from the `Accept` header
    pub fn by_semver_accept<I, S>(
        supported: I,
        vendor: impl Into<String>,
        separator: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let resolver = RangeResolver::new(supported)?;
        let matcher = TokenMatcher::builder(TokenSource::accept_with(vendor, separator, suffix))
            .ranges(true)
            .build()?;
        Ok(Self::new(matcher).with_resolver(resolver))
    }

    /// The configured matcher
    pub fn matcher(&self) -> &TokenMatcher {
        &self.matcher
    }

    /// The configured resolver, if any
    pub fn resolver(&self) -> Option<&RangeResolver> {
        self.resolver.as_deref()
    }

    /// Record the version context on `req`
    ///
    /// A request without a token is left untouched.
    pub fn annotate(&self, req: &mut Request) -> Result<(), ApiError> {
        let Some(found) = self.matcher.extract(req) else {
            tracing::trace!(path = %req.path(), "no version token in request");
            return Ok(());
        };

        let version = match &self.resolver {
            Some(resolver) => resolver.resolve(&found.token)?,
            None => Some(found.token.clone()),
        };

        tracing::debug!(
            original = %found.token,
            version = ?version,
            "resolved request version"
        );
        req.set_version_context(VersionContext::matched(found.token, version));
        Ok(())
    }
}

impl MiddlewareLayer for VersionLayer {
    fn call(&self, mut req: Request, next: BoxedNext) -> BoxFuture {
        match self.annotate(&mut req) {
            Ok(()) => next(req),
            Err(err) => {
                tracing::debug!(
                    status = err.status.as_u16(),
                    reason = ?err.internal_details(),
                    "version resolution rejected request"
                );
                Box::pin(async move { err.into_response() })
            }
        }
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}

impl std::fmt::Debug for VersionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionLayer")
            .field("source", self.matcher.source())
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;

    fn supported() -> Vec<&'static str> {
        vec!["v1.0.0", "v1.0.1", "v1.1.0", "v1.1.1"]
    }

    fn path_request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    fn accept_request(accept: &str) -> Request {
        http::Request::builder()
            .uri("/foo")
            .header(http::header::ACCEPT, accept)
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    fn annotated(layer: &VersionLayer, mut req: Request) -> Request {
        layer.annotate(&mut req).unwrap();
        req
    }

    #[test]
    fn test_by_path_echoes_token() {
        let layer = VersionLayer::by_path("/").unwrap();

        for (path, expected) in [("/v1/foo", "v1"), ("/v1.1/foo", "v1.1"), ("/v1.1.1/foo", "v1.1.1")] {
            let req = annotated(&layer, path_request(path));
            assert_eq!(req.api_version(), Some(expected));
            assert_eq!(req.original_api_version(), Some(expected));
        }

        let req = annotated(&layer, path_request("/foo"));
        assert!(req.version_context().is_none());
    }

    #[test]
    fn test_by_path_invalid_prefix() {
        assert!(VersionLayer::by_path("/prefix").is_err());
        assert!(VersionLayer::by_semver_path(supported(), "/prefix").is_err());
    }

    #[test]
    fn test_by_semver_path() {
        let layer = VersionLayer::by_semver_path(supported(), "/").unwrap();

        let req = annotated(&layer, path_request("/v1/foo"));
        assert_eq!(req.original_api_version(), Some("v1"));
        assert_eq!(req.api_version(), Some("v1.0.0"));

        let req = annotated(&layer, path_request("/%5Ev1.0.0/foo"));
        assert_eq!(req.original_api_version(), Some("^v1.0.0"));
        assert_eq!(req.api_version(), Some("v1.1.1"));

        let req = annotated(&layer, path_request("/v1%20-%20v2/foo"));
        assert_eq!(req.original_api_version(), Some("v1 - v2"));
        assert_eq!(req.api_version(), Some("v1.1.1"));
    }

    #[test]
    fn test_unsatisfied_range_keeps_original_only() {
        let layer = VersionLayer::by_semver_path(supported(), "/").unwrap();

        let req = annotated(&layer, path_request("/v2/foo"));
        assert_eq!(req.original_api_version(), Some("v2"));
        assert_eq!(req.api_version(), None);
    }

    #[test]
    fn test_by_semver_path_requires_versions() {
        assert!(matches!(
            VersionLayer::by_semver_path(Vec::<String>::new(), "/"),
            Err(ConfigError::NoSupportedVersions)
        ));
    }

    #[test]
    fn test_by_accept() {
        let layer = VersionLayer::by_accept("vnd.test", ".", "+json").unwrap();

        let req = annotated(&layer, accept_request("application/vnd.test.v1.1+json"));
        assert_eq!(req.api_version(), Some("v1.1"));

        let req = annotated(&layer, path_request("/v1/foo"));
        assert_eq!(req.api_version(), None);
    }

    #[test]
    fn test_by_semver_accept() {
        let layer = VersionLayer::by_semver_accept(supported(), "vnd.test", ".", "+json").unwrap();

        let req = annotated(&layer, accept_request("application/vnd.test.~v1.0.0+json"));
        assert_eq!(req.original_api_version(), Some("~v1.0.0"));
        assert_eq!(req.api_version(), Some("v1.0.1"));
    }

    #[test]
    fn test_by_accept_requires_vendor() {
        assert!(matches!(
            VersionLayer::by_accept("", ".", "+json"),
            Err(ConfigError::MissingVendorPrefix)
        ));
        assert!(matches!(
            VersionLayer::by_semver_accept(supported(), "", ".", "+json"),
            Err(ConfigError::MissingVendorPrefix)
        ));
    }

    #[test]
    fn test_prerelease_lock_rejects() {
        let resolver = RangeResolver::new(["v1.0.0-alpha.1"])
            .unwrap()
            .lock_prerelease(true);
        let matcher = TokenMatcher::builder(TokenSource::path("/"))
            .ranges(true)
            .build()
            .unwrap();
        let layer = VersionLayer::new(matcher).with_resolver(resolver);

        let mut req = path_request("/v1.0.0-alpha.1/foo");
        let err = layer.annotate(&mut req).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(req.version_context().is_none());
    }
}
