//! Request version resolution
//!
//! The pieces compose into a pipeline:
//!
//! 1. [`TokenMatcher`] finds a version token in the path or a header
//! 2. [`RangeResolver`] turns a range token into the best supported version
//! 3. [`VersionLayer`] records both on the request as a [`VersionContext`]
//! 4. [`ValidateVersionLayer`] rejects versions outside an allow-list
//! 5. [`MultiVersion`] dispatches to a version-specific handler
//!
//! # Example
//!
//! ```rust,ignore
//! use reqver_core::versioning::*;
//! use reqver_core::LayerStack;
//!
//! let stack = LayerStack::new()
//!     .layer(VersionLayer::by_semver_path(["v1.0.0", "v1.1.0"], "/api/")?)
//!     .layer(ValidateVersionLayer::allowing(["v1.1.0"])?);
//! ```

mod config;
mod context;
mod dispatch;
mod layer;
mod matcher;
mod normalize;
mod range;
mod resolver;
mod validator;


pub use config::{ValidationConfig, VersionPipeline, VersioningConfig};
pub use context::VersionContext;
pub use dispatch::{version_sorter, MultiVersion, WILDCARD};
pub use layer::VersionLayer;
pub use matcher::{TokenMatch, TokenMatcher, TokenMatcherBuilder, TokenSource};
pub use normalize::normalize;
pub use range::{parse_version, SupportedVersions, VersionRange};
pub use resolver::{is_prerelease_lock, RangeResolver, DEFAULT_PRERELEASE_MESSAGE};
pub use validator::{ValidateVersionLayer, VersionValidator, DEFAULT_UNSUPPORTED_MESSAGE};
