//! Pattern dispatch.
//!
//! # Responsibilities
//! - Accept `(pattern, handler)` registrations from a built route tree
//! - Match incoming requests by path, then by method
//! - Answer 404 / 405 for requests no registration covers
//!
//! # Design Decisions
//! - Patterns are `[METHOD ]/path`; the path uses `matchit` syntax
//!   (`/users/{id}`, `/files/{*rest}`)
//! - Paths match exactly. `/` and `/static/` are not subtree catch-alls as
//!   in Go's `ServeMux`; register `/{*rest}` or `/static/{*rest}` for that
//! - A pattern without a method matches every method; `GET` also answers `HEAD`
//! - Registration is fallible and reports the first conflict; the mux never
//!   silently replaces a handler
//! - Immutable once served: `into_service` moves it behind an `Arc`

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::Service;

use crate::http::{response, PathParams};
use crate::routing::Handler;
use crate::{Error, Result};

/// Receiver of the bindings produced by a route tree build.
pub trait Dispatcher {
    /// Error reported when a registration is rejected.
    type Error;

    /// Register a fully-wrapped handler for a pattern.
    fn register(&mut self, pattern: &str, handler: Handler) -> std::result::Result<(), Self::Error>;
}

/// A flattened `(pattern, handler)` pair.
#[derive(Debug, Clone)]
pub struct Binding {
    pub pattern: String,
    pub handler: Handler,
}

impl Dispatcher for Vec<Binding> {
    type Error = Infallible;

    fn register(&mut self, pattern: &str, handler: Handler) -> std::result::Result<(), Infallible> {
        self.push(Binding {
            pattern: pattern.to_string(),
            handler,
        });
        Ok(())
    }
}

/// Split a pattern into its optional method and its path.
fn parse_pattern(pattern: &str) -> Result<(Option<Method>, &str)> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "empty pattern",
        });
    }

    let (method, path) = match trimmed.split_once(char::is_whitespace) {
        Some((method, path)) => {
            let method = Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod {
                pattern: pattern.to_string(),
                method: method.to_string(),
            })?;
            (Some(method), path.trim_start())
        }
        None => (None, trimmed),
    };

    if !path.starts_with('/') {
        return Err(Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "path must begin with '/'",
        });
    }

    Ok((method, path))
}

/// Handlers registered for one path.
#[derive(Debug, Default)]
struct Endpoint {
    methods: Vec<(Method, Handler)>,
    any: Option<Handler>,
}

impl Endpoint {
    /// Returns false if the slot is already taken.
    fn insert(&mut self, method: Option<Method>, handler: Handler) -> bool {
        match method {
            Some(method) => {
                if self.methods.iter().any(|(m, _)| *m == method) {
                    return false;
                }
                self.methods.push((method, handler));
            }
            None => {
                if self.any.is_some() {
                    return false;
                }
                self.any = Some(handler);
            }
        }
        true
    }

    fn find(&self, method: &Method) -> Option<&Handler> {
        let exact = |wanted: &Method| {
            self.methods
                .iter()
                .find(|(m, _)| m == wanted)
                .map(|(_, h)| h)
        };

        exact(method)
            .or_else(|| (*method == Method::HEAD).then(|| exact(&Method::GET)).flatten())
            .or(self.any.as_ref())
    }

    fn allow_header(&self) -> String {
        let mut allowed: Vec<&str> = self.methods.iter().map(|(m, _)| m.as_str()).collect();
        if allowed.contains(&"GET") && !allowed.contains(&"HEAD") {
            allowed.push("HEAD");
        }
        allowed.sort_unstable();
        allowed.join(", ")
    }
}

/// Path-and-method request multiplexer.
pub struct Mux {
    paths: matchit::Router<usize>,
    endpoints: Vec<Endpoint>,
    index: HashMap<String, usize>,
    routes: usize,
}

impl Mux {
    /// Create an empty mux.
    pub fn new() -> Self {
        Self {
            paths: matchit::Router::new(),
            endpoints: Vec::new(),
            index: HashMap::new(),
            routes: 0,
        }
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }

    /// Route one request to its handler.
    pub fn dispatch(&self, mut req: Request) -> BoxFuture<'static, Response> {
        let (slot, params) = match self.paths.at(req.uri().path()) {
            Ok(matched) => {
                let params: Vec<(String, String)> = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (*matched.value, params)
            }
            Err(_) => {
                tracing::debug!(path = %req.uri().path(), "No route matched");
                return futures_util::future::ready(response::error(StatusCode::NOT_FOUND)).boxed();
            }
        };

        let endpoint = &self.endpoints[slot];
        match endpoint.find(req.method()) {
            Some(handler) => {
                if !params.is_empty() {
                    req.extensions_mut().insert(PathParams::new(params));
                }
                handler.run(req)
            }
            None => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "Method not allowed"
                );
                let mut res = response::error(StatusCode::METHOD_NOT_ALLOWED);
                if let Ok(allow) = HeaderValue::from_str(&endpoint.allow_header()) {
                    res.headers_mut().insert(header::ALLOW, allow);
                }
                futures_util::future::ready(res).boxed()
            }
        }
    }

    /// Freeze the mux into a cloneable tower service.
    pub fn into_service(self) -> MuxService {
        MuxService {
            mux: Arc::new(self),
        }
    }
}

impl Dispatcher for Mux {
    type Error = Error;

    fn register(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        let (method, path) = parse_pattern(pattern)?;

        let slot = match self.index.get(path) {
            Some(&slot) => slot,
            None => {
                let slot = self.endpoints.len();
                self.paths
                    .insert(path, slot)
                    .map_err(|source| Error::Conflict {
                        pattern: pattern.to_string(),
                        source,
                    })?;
                self.endpoints.push(Endpoint::default());
                self.index.insert(path.to_string(), slot);
                slot
            }
        };

        if !self.endpoints[slot].insert(method, handler) {
            return Err(Error::DuplicateRoute {
                pattern: pattern.to_string(),
            });
        }

        self.routes += 1;
        tracing::debug!(pattern = %pattern, "Pattern registered");
        Ok(())
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Mux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mux")
            .field("paths", &self.index.keys().collect::<Vec<_>>())
            .field("routes", &self.routes)
            .finish()
    }
}

/// A built mux, shared across connections.
#[derive(Debug, Clone)]
pub struct MuxService {
    mux: Arc<Mux>,
}

impl Service<Request> for MuxService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, std::result::Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        self.mux.dispatch(req).map(Ok).boxed()
    }
}
