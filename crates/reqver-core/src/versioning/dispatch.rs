//! Multi-version dispatch
//!
//! Routes a request to one of several version-specific handlers according
//! to its resolved version, with a mandatory `*` default.
//!
//! ```rust,ignore
//! let handler = MultiVersion::new([
//!     ("*", handler_fn(current)),
//!     ("v1.0.1", handler_fn(legacy)),
//! ])?
//! .into_handler();
//! ```

use super::normalize::normalize;
use super::range::parse_version;
use crate::error::ConfigError;
use crate::middleware::{BoxFuture, BoxedNext};
use crate::request::Request;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Key of the default handler
pub const WILDCARD: &str = "*";

/// Ordering of dispatch keys
///
/// The wildcard always sorts last. Concrete keys sort by descending
/// semantic version; keys that do not parse as versions come after those
/// that do. Remaining ties fall back to plain string order.
pub fn version_sorter(a: &str, b: &str) -> Ordering {
    match (a == WILDCARD, b == WILDCARD) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let parsed_a = parse_version(&normalize(a)).ok();
    let parsed_b = parse_version(&normalize(b)).ok();
    match (parsed_a, parsed_b) {
        (Some(va), Some(vb)) => vb.cmp(&va).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Version-keyed handler table
pub struct MultiVersion<H = BoxedNext> {
    /// Concrete keys in dispatch order
    routes: Vec<(String, H)>,
    fallback: H,
}

impl<H> MultiVersion<H> {
    /// Build a dispatcher from `(version, handler)` pairs
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingDefaultHandler`] without a `*` entry and
    /// [`ConfigError::DuplicateHandler`] when a key repeats.
    pub fn new<I, K>(handlers: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, H)>,
        K: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut routes = Vec::new();
        for (key, handler) in handlers {
            let key = key.into();
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateHandler(key));
            }
            routes.push((key, handler));
        }

        routes.sort_by(|(a, _), (b, _)| version_sorter(a, b));

        let fallback = match routes.pop() {
            Some((key, handler)) if key == WILDCARD => handler,
            _ => return Err(ConfigError::MissingDefaultHandler),
        };

        Ok(Self { routes, fallback })
    }

    /// Concrete version keys in dispatch order (wildcard excluded)
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(key, _)| key.as_str())
    }

    /// Pick the handler for a resolved version
    pub fn select(&self, version: Option<&str>) -> &H {
        version
            .and_then(|version| self.routes.iter().find(|(key, _)| key == version))
            .map(|(_, handler)| handler)
            .unwrap_or(&self.fallback)
    }
}

impl MultiVersion<BoxedNext> {
    /// Invoke the handler matching the request's resolved version
    pub fn call(&self, req: Request) -> BoxFuture {
        let handler = self.select(req.api_version()).clone();
        tracing::trace!(version = ?req.api_version(), "dispatching versioned handler");
        handler(req)
    }

    /// Turn the dispatcher into a handler usable at the end of a layer stack
    pub fn into_handler(self) -> BoxedNext {
        let dispatcher = Arc::new(self);
        Arc::new(move |req: Request| dispatcher.call(req))
    }
}

impl<H> fmt::Debug for MultiVersion<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiVersion")
            .field("versions", &self.versions().collect::<Vec<_>>())
            .finish()
    }
}
