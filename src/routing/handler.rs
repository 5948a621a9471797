//! Type-erased request handlers.
//!
//! # Responsibilities
//! - Erase async functions and tower services into a single cloneable type
//! - Act as both a route's terminal handler and the `next` handed to middleware
//! - Expose itself as a `tower::Service` so it can be served directly
//!
//! # Design Decisions
//! - `Arc` inside: cloning a handler is a refcount bump, so each request can
//!   own its copy of the chain without shared mutable state
//! - Infallible: errors are turned into responses by the handler itself

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::{Service, ServiceExt};

type BoxHandlerFn = dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync;

/// A terminal request handler, or a handler already wrapped in middleware.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<BoxHandlerFn>,
}

/// The wrapped handler passed to middleware.
pub type Next = Handler;

impl Handler {
    /// Create a handler from an async function.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        Self {
            inner: Arc::new(move |req| f(req).map(IntoResponse::into_response).boxed()),
        }
    }

    /// Create a handler from an infallible tower service.
    pub fn from_service<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Future: Send + 'static,
    {
        Self::new(move |req| {
            let service = service.clone();
            async move {
                match service.oneshot(req).await {
                    Ok(res) => res,
                    Err(never) => match never {},
                }
            }
        })
    }

    /// Run the handler for one request.
    pub fn run(&self, req: Request) -> BoxFuture<'static, Response> {
        (self.inner)(req)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

impl Service<Request> for Handler {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        self.run(req).map(Ok).boxed()
    }
}
