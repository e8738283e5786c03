//! Request types for request versioning

use crate::versioning::VersionContext;
use bytes::Bytes;
use http::{request::Parts, Extensions, HeaderMap, Method, Uri};

/// HTTP Request wrapper
///
/// Provides access to the parts of an incoming HTTP request that the
/// versioning stages read, and carries the per-request [`VersionContext`]
/// in its extensions.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Option<Bytes>,
}

impl Request {
    /// Create a new request from parts and a buffered body
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            parts,
            body: Some(body),
        }
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Get the URI
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Get a header value as a string, if present and valid UTF-8 visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get request extensions
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Get mutable extensions
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Get the raw (still percent-encoded) request path
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Get the query string
    pub fn query_string(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    /// Take the body bytes (can only be called once)
    pub fn take_body(&mut self) -> Option<Bytes> {
        self.body.take()
    }

    /// Version information recorded by a resolution stage, if any ran and matched
    pub fn version_context(&self) -> Option<&VersionContext> {
        self.parts.extensions.get::<VersionContext>()
    }

    /// The resolved version, shorthand for `version_context().version()`
    pub fn api_version(&self) -> Option<&str> {
        self.version_context().and_then(VersionContext::version)
    }

    /// The version token as it appeared in the request
    pub fn original_api_version(&self) -> Option<&str> {
        self.version_context()
            .and_then(VersionContext::original_version)
    }

    pub(crate) fn set_version_context(&mut self, context: VersionContext) {
        self.parts.extensions.insert(context);
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, body)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("version_context", &self.version_context())
            .finish()
    }
}
