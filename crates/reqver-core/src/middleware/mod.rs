//! Middleware infrastructure
//!
//! Versioning stages are [`MiddlewareLayer`]s and compose with any other
//! layer in a [`LayerStack`].
//!
//! # Example
//!
//! ```rust,ignore
//! use reqver_core::middleware::{handler_fn, LayerStack};
//! use reqver_core::versioning::VersionLayer;
//!
//! let stack = LayerStack::new().layer(VersionLayer::by_path("/api/")?);
//! let response = stack.execute(request, handler_fn(handler)).await;
//! ```

mod layer;

pub use layer::{handler_fn, BoxFuture, BoxedNext, LayerStack, MiddlewareLayer};
