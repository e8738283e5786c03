//! Middleware pipeline
//!
//! A request passes through a [`LayerStack`] of [`MiddlewareLayer`]s before
//! reaching the final handler. Each layer receives the request together with
//! the continuation ([`BoxedNext`]) and either calls it or short-circuits with
//! its own response.

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by layers and handlers
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A boxed next function for middleware chains
pub type BoxedNext = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Trait for middleware that can be placed in a [`LayerStack`]
pub trait MiddlewareLayer: Send + Sync + 'static {
    /// Apply this middleware to a request, calling `next` to continue the chain
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture;

    /// Clone this middleware into a boxed trait object
    fn clone_box(&self) -> Box<dyn MiddlewareLayer>;
}

impl Clone for Box<dyn MiddlewareLayer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Wrap an async function as a final handler
///
/// ```rust,ignore
/// let handler = handler_fn(|req: Request| async move {
///     format!("served {}", req.api_version().unwrap_or("none"))
/// });
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> BoxedNext
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req: Request| {
        let fut = f(req);
        Box::pin(async move { fut.await.into_response() }) as BoxFuture
    })
}

/// A stack of middleware layers
#[derive(Clone, Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn MiddlewareLayer>>,
}

impl LayerStack {
    /// Create a new empty layer stack
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a middleware layer to the stack
    ///
    /// Layers are executed in the order they are added (outermost first).
    pub fn push(&mut self, layer: Box<dyn MiddlewareLayer>) {
        self.layers.push(layer);
    }

    /// Builder-style [`LayerStack::push`]
    pub fn layer<L: MiddlewareLayer>(mut self, layer: L) -> Self {
        self.push(Box::new(layer));
        self
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Get the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Execute the middleware stack with a final handler
    pub fn execute(&self, req: Request, handler: BoxedNext) -> BoxFuture {
        if self.layers.is_empty() {
            return handler(req);
        }

        // Build the chain from inside out so the first layer pushed runs first
        let mut next = handler;

        for layer in self.layers.iter().rev() {
            let layer: Arc<dyn MiddlewareLayer> = Arc::from(layer.clone_box());
            let inner = next;
            next = Arc::new(move |req: Request| layer.call(req, inner.clone()));
        }

        next(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use bytes::Bytes;
    use http::StatusCode;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    type Log = Arc<Mutex<Vec<(usize, &'static str)>>>;

    #[derive(Clone)]
    struct Recorder {
        id: usize,
        log: Log,
    }

    impl MiddlewareLayer for Recorder {
        fn call(&self, req: Request, next: BoxedNext) -> BoxFuture {
            let id = self.id;
            let log = self.log.clone();
            Box::pin(async move {
                log.lock().unwrap().push((id, "pre"));
                let response = next(req).await;
                log.lock().unwrap().push((id, "post"));
                response
            })
        }

        fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
            Box::new(self.clone())
        }
    }

    #[derive(Clone)]
    struct Reject;

    impl MiddlewareLayer for Reject {
        fn call(&self, _req: Request, _next: BoxedNext) -> BoxFuture {
            Box::pin(async { ApiError::bad_request("rejected").into_response() })
        }

        fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_empty_stack_calls_handler_directly() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let stack = LayerStack::new();
            let handler = handler_fn(|_req: Request| async { "direct" });

            let response = stack.execute(request("/v1/foo"), handler).await;
            assert_eq!(response.status(), StatusCode::OK);
        });
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_layers_run_outermost_first(num_layers in 1usize..8usize) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let log: Log = Arc::new(Mutex::new(Vec::new()));

            let mut stack = LayerStack::new();
            for id in 0..num_layers {
                stack.push(Box::new(Recorder { id, log: log.clone() }));
            }

            rt.block_on(stack.execute(request("/v1/foo"), handler_fn(|_req: Request| async {})));

            let log = log.lock().unwrap();
            prop_assert_eq!(log.len(), num_layers * 2);
            for id in 0..num_layers {
                prop_assert_eq!(log[id], (id, "pre"));
                prop_assert_eq!(log[num_layers + id], (num_layers - 1 - id, "post"));
            }
        }
    }

    #[test]
    fn test_rejecting_layer_short_circuits() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let log: Log = Arc::new(Mutex::new(Vec::new()));
            let called = Arc::new(AtomicBool::new(false));

            let stack = LayerStack::new()
                .layer(Recorder { id: 0, log: log.clone() })
                .layer(Reject)
                .layer(Recorder { id: 1, log: log.clone() });

            let flag = called.clone();
            let handler = handler_fn(move |_req: Request| {
                let flag = flag.clone();
                async move { flag.store(true, Ordering::SeqCst) }
            });

            let response = stack.execute(request("/v1/foo"), handler).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(!called.load(Ordering::SeqCst));
            assert_eq!(*log.lock().unwrap(), vec![(0, "pre"), (0, "post")]);
        });
    }
}
