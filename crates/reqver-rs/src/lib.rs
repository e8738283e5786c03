//! # reqver
//!
//! Request-level API version resolution for Rust services.
//!
//! reqver reads a version token from the request path or from a vendor media
//! type in a header, optionally resolves it as a semantic-version range
//! against the versions your service supports, and makes the result
//! available to the rest of the request pipeline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reqver_rs::prelude::*;
//!
//! let stack = LayerStack::new()
//!     .layer(VersionLayer::by_semver_path(["v1.0.0", "v1.1.0", "v2.0.0"], "/api/")?)
//!     .layer(ValidateVersionLayer::allowing(["v1.1.0", "v2.0.0"])?);
//!
//! let handler = MultiVersion::new([
//!     ("*", handler_fn(current)),
//!     ("v1.1.0", handler_fn(legacy)),
//! ])?
//! .into_handler();
//!
//! // GET /api/^v1.0.0/users  ->  legacy handler, version "v1.1.0"
//! let response = stack.execute(request, handler).await;
//! ```
//!
//! ## Features
//!
//! - **Path or header tokens**: `/api/v1.2/users` or
//!   `Accept: application/vnd.myorg.v1.2+json`
//! - **Range resolution**: `^`, `~`, x-ranges, hyphen ranges and `||`
//! - **Prerelease lock-out**: optionally refuse requests pinned to a prerelease
//! - **Validation**: reject anything outside an allow-list
//! - **Dispatch**: version-keyed handlers with a `*` default
//! - **Declarative config**: build the whole pipeline from JSON

// Re-export core functionality
pub use reqver_core::*;

// Re-exports for user convenience
pub use serde_json;
pub use tracing;

/// Prelude module - import everything you need with `use reqver_rs::prelude::*`
pub mod prelude {
    // Core types
    pub use reqver_core::{
        handler_fn,
        // Error handling
        ApiError,
        BoxFuture,
        BoxedNext,
        ConfigError,
        IntoResponse,
        // Middleware
        LayerStack,
        MiddlewareLayer,
        Request,
        Response,
        Result,
    };

    // Versioning
    pub use reqver_core::versioning::{
        MultiVersion, RangeResolver, TokenMatcher, TokenSource, ValidateVersionLayer,
        ValidationConfig, VersionContext, VersionLayer, VersionPipeline, VersionValidator,
        VersioningConfig,
    };

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}
