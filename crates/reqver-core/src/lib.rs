//! # reqver Core
//!
//! Request-level API version resolution: token extraction from the path or
//! a media-type header, semantic-version range resolution against a
//! supported set, allow-list validation, and version-keyed dispatch.
//!
//! This crate is not meant to be used directly. Use `reqver-rs` instead.

mod error;
pub mod middleware;
mod request;
mod response;
pub mod versioning;

// Public API
pub use error::{ApiError, ConfigError, Result};
pub use middleware::{handler_fn, BoxFuture, BoxedNext, LayerStack, MiddlewareLayer};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use versioning::{
    MultiVersion, RangeResolver, TokenMatcher, TokenSource, ValidateVersionLayer, VersionContext,
    VersionLayer, VersionValidator, VersioningConfig,
};
