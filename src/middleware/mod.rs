//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Router::use_middleware(mw)
//!     → stored in the node's ordered chain
//!     → at build time, chain [m1, .., mk] wraps a route handler h as
//!       m1(m2(..mk(h)..))
//!     → request enters m1 first, reaches h last
//! ```
//!
//! # Design Decisions
//! - A middleware is anything that turns one `Handler` into another; plain
//!   closures `Fn(Handler) -> Handler` implement the trait directly
//! - `from_fn` adapts an async `(Request, Next) -> Response` function
//! - `from_layer` adapts any `tower::Layer`, so `tower-http` layers compose
//!   in the same chain
//! - The tree never inspects what a middleware does: short-circuiting is just
//!   a middleware that does not run `next`

pub mod headers;
pub mod logging;
pub mod request_id;

pub use headers::set_header;
pub use logging::log_requests;
pub use request_id::request_id;

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::routing::{Handler, Next};

/// A transform from one handler into another.
pub trait Middleware: Send + Sync + 'static {
    /// Wrap `next`, returning the handler that runs in its place.
    fn wrap(&self, next: Handler) -> Handler;
}

impl<F> Middleware for F
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    fn wrap(&self, next: Handler) -> Handler {
        self(next)
    }
}

/// Build a middleware from an async function receiving the request and the
/// wrapped handler.
///
/// ```
/// use route_tree::middleware::{self, Middleware};
/// use route_tree::routing::Next;
/// use axum::extract::Request;
///
/// let mw = middleware::from_fn(|req: Request, next: Next| async move {
///     let mut res = next.run(req).await;
///     res.headers_mut().insert("x-powered-by", "route-tree".parse().unwrap());
///     res
/// });
/// # let _ = mw;
/// ```
pub fn from_fn<F, Fut, R>(f: F) -> impl Middleware + Clone
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    let f = Arc::new(f);
    move |next: Handler| {
        let f = Arc::clone(&f);
        Handler::new(move |req: Request| f(req, next.clone()))
    }
}

/// Build a middleware from a tower layer.
///
/// The layered service must keep the response type and stay infallible, which
/// holds for most `tower-http` layers (`SetResponseHeaderLayer`,
/// `TimeoutLayer`, `MapRequestLayer`, ..).
pub fn from_layer<L>(layer: L) -> impl Middleware + Clone
where
    L: Layer<Handler> + Clone + Send + Sync + 'static,
    L::Service: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    <L::Service as Service<Request>>::Future: Send + 'static,
{
    move |next: Handler| Handler::from_service(layer.layer(next))
}
