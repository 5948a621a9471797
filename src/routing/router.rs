//! Route tree.
//!
//! # Responsibilities
//! - Collect routes, middleware and child routers during configuration
//! - Flatten the tree into `(pattern, handler)` bindings at build time
//! - Hand each binding to a `Dispatcher`
//!
//! # Design Decisions
//! - A node's effective chain is its ancestors' middleware followed by its
//!   own; the route handler ends up wrapped as `m1(m2(..mk(h)..))`
//! - Pre-order walk: a node emits its own routes before visiting children
//! - `build` borrows the tree immutably and wraps clones of the stored
//!   handlers, so building is repeatable and never double-wraps
//! - `mount` takes the child by value: a router has at most one parent

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::IntoResponse;

use crate::middleware::Middleware;
use crate::routing::mux::{Binding, Dispatcher, Mux};
use crate::routing::Handler;
use crate::Result;

/// A locally registered route.
#[derive(Debug, Clone)]
struct Route {
    pattern: String,
    handler: Handler,
}

/// A node of the route tree.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
    middlewares: Vec<Arc<dyn Middleware>>,
    children: Vec<Router>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware to this router's chain.
    ///
    /// It applies to the routes of this router and of every descendant,
    /// wrapping inside the middleware inherited from ancestors.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Register a handler for a pattern.
    pub fn handle(&mut self, pattern: impl Into<String>, handler: Handler) -> &mut Self {
        self.routes.push(Route {
            pattern: pattern.into(),
            handler,
        });
        self
    }

    /// Register an async function for a pattern.
    pub fn handle_fn<F, Fut, R>(&mut self, pattern: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        self.handle(pattern, Handler::new(f))
    }

    /// Create a child router, let `configure` fill it in, then mount it.
    pub fn group<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Router),
    {
        let mut group = Router::new();
        configure(&mut group);
        self.mount(group)
    }

    /// Attach an independently built router as a child.
    ///
    /// The child keeps its own middleware innermost; this router's chain
    /// wraps it at build time. To attach the same configuration twice,
    /// `clone()` it: each copy is a separate node and binds its routes once
    /// under its own parent's chain.
    pub fn mount(&mut self, subrouter: Router) -> &mut Self {
        self.children.push(subrouter);
        self
    }

    /// Flatten the tree and register every binding with `dispatcher`.
    ///
    /// Stops at the first registration error and returns it unchanged.
    pub fn build<D: Dispatcher>(&self, dispatcher: &mut D) -> std::result::Result<(), D::Error> {
        let mut count = 0;
        self.apply(dispatcher, &[], 0, &mut count)?;
        tracing::info!(routes = count, "Route tree built");
        Ok(())
    }

    /// Flatten the tree into its binding set.
    pub fn bindings(&self) -> Vec<Binding> {
        let mut bindings = Vec::new();
        match self.build(&mut bindings) {
            Ok(()) => bindings,
            Err(never) => match never {},
        }
    }

    /// Build a fully populated mux from this tree.
    pub fn mux(&self) -> Result<Mux> {
        let mut mux = Mux::new();
        self.build(&mut mux)?;
        Ok(mux)
    }

    /// Consume the tree and build a fully populated mux.
    pub fn into_mux(self) -> Result<Mux> {
        self.mux()
    }

    /// Number of routes registered directly on this router.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Number of routes in this router and all descendants.
    pub fn total_route_count(&self) -> usize {
        self.routes.len()
            + self
                .children
                .iter()
                .map(Router::total_route_count)
                .sum::<usize>()
    }

    fn apply<D: Dispatcher>(
        &self,
        dispatcher: &mut D,
        inherited: &[Arc<dyn Middleware>],
        depth: usize,
        count: &mut usize,
    ) -> std::result::Result<(), D::Error> {
        let chain: Vec<Arc<dyn Middleware>> = inherited
            .iter()
            .chain(&self.middlewares)
            .cloned()
            .collect();

        for route in &self.routes {
            let handler = chain
                .iter()
                .rev()
                .fold(route.handler.clone(), |next, middleware| middleware.wrap(next));

            tracing::debug!(
                pattern = %route.pattern,
                depth,
                layers = chain.len(),
                "Binding route"
            );
            dispatcher.register(&route.pattern, handler)?;
            *count += 1;
        }

        for child in &self.children {
            child.apply(dispatcher, &chain, depth + 1, count)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self.routes.iter().map(|r| r.pattern.as_str()).collect::<Vec<_>>(),
            )
            .field("middlewares", &self.middlewares.len())
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::body::Body;

    type Log = Arc<Mutex<Vec<String>>>;

    fn record(log: &Log, name: &'static str) -> impl Middleware + Clone {
        let log = Arc::clone(log);
        move |next: Handler| {
            let log = Arc::clone(&log);
            Handler::new(move |req| {
                log.lock().unwrap().push(name.to_string());
                let next = next.clone();
                async move { next.run(req).await }
            })
        }
    }

    fn terminal(log: &Log, name: &'static str) -> Handler {
        let log = Arc::clone(log);
        Handler::new(move |_req| {
            log.lock().unwrap().push(name.to_string());
            async { "done" }
        })
    }

    async fn invoke(bindings: &[Binding], pattern: &str) {
        let binding = bindings
            .iter()
            .find(|b| b.pattern == pattern)
            .expect("binding present");
        binding.handler.run(Request::new(Body::empty())).await;
    }

    #[tokio::test]
    async fn test_chain_runs_in_registration_order() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router
            .use_middleware(record(&log, "m1"))
            .use_middleware(record(&log, "m2"))
            .use_middleware(record(&log, "m3"))
            .handle("/x", terminal(&log, "h"));

        invoke(&router.bindings(), "/x").await;
        assert_eq!(*log.lock().unwrap(), ["m1", "m2", "m3", "h"]);
    }

    #[tokio::test]
    async fn test_middleware_registered_after_route_still_applies() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router.handle("/x", terminal(&log, "h"));
        router.use_middleware(record(&log, "late"));

        invoke(&router.bindings(), "/x").await;
        assert_eq!(*log.lock().unwrap(), ["late", "h"]);
    }

    #[tokio::test]
    async fn test_nested_groups_accumulate() {
        let log: Log = Arc::default();
        let mut root = Router::new();
        root.use_middleware(record(&log, "root"));
        root.group(|a| {
            a.use_middleware(record(&log, "a"));
            a.group(|b| {
                b.use_middleware(record(&log, "b1"));
                b.use_middleware(record(&log, "b2"));
                b.handle("/deep", terminal(&log, "h"));
            });
        });

        invoke(&root.bindings(), "/deep").await;
        assert_eq!(*log.lock().unwrap(), ["root", "a", "b1", "b2", "h"]);
    }

    #[tokio::test]
    async fn test_sibling_groups_are_isolated() {
        let log: Log = Arc::default();
        let mut root = Router::new();
        root.group(|g| {
            g.use_middleware(record(&log, "left"));
            g.handle("/left", terminal(&log, "l"));
        });
        root.group(|g| {
            g.use_middleware(record(&log, "right"));
            g.handle("/right", terminal(&log, "r"));
        });
        root.handle("/root", terminal(&log, "root"));

        let bindings = root.bindings();
        invoke(&bindings, "/right").await;
        assert_eq!(*log.lock().unwrap(), ["right", "r"]);

        log.lock().unwrap().clear();
        invoke(&bindings, "/root").await;
        assert_eq!(*log.lock().unwrap(), ["root"]);
    }

    #[tokio::test]
    async fn test_mounted_router_keeps_own_middleware_innermost() {
        let log: Log = Arc::default();
        let mut protected = Router::new();
        protected.use_middleware(record(&log, "auth"));
        protected.handle("/profile", terminal(&log, "h"));

        let mut root = Router::new();
        root.use_middleware(record(&log, "logger"));
        root.mount(protected);

        invoke(&root.bindings(), "/profile").await;
        assert_eq!(*log.lock().unwrap(), ["logger", "auth", "h"]);
    }

    #[test]
    fn test_emission_order_is_pre_order() {
        let mut root = Router::new();
        root.handle("/a", Handler::new(|_req| async { "" }));
        root.group(|g| {
            g.handle("/b", Handler::new(|_req| async { "" }));
            g.group(|g| {
                g.handle("/c", Handler::new(|_req| async { "" }));
            });
        });
        root.handle("/d", Handler::new(|_req| async { "" }));
        root.group(|g| {
            g.handle("/e", Handler::new(|_req| async { "" }));
        });

        let patterns: Vec<String> = root.bindings().into_iter().map(|b| b.pattern).collect();
        assert_eq!(patterns, ["/a", "/d", "/b", "/c", "/e"]);
    }

    #[test]
    fn test_empty_router_propagates_to_children() {
        let mut root = Router::new();
        root.use_middleware(|next: Handler| next);
        root.group(|g| {
            g.handle("/only", Handler::new(|_req| async { "" }));
        });

        assert_eq!(root.route_count(), 0);
        assert_eq!(root.total_route_count(), 1);
        assert_eq!(root.bindings().len(), 1);
    }

    #[tokio::test]
    async fn test_rebuild_does_not_double_wrap() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router.use_middleware(record(&log, "m"));
        router.handle("/x", terminal(&log, "h"));

        let _first = router.bindings();
        invoke(&router.bindings(), "/x").await;
        assert_eq!(*log.lock().unwrap(), ["m", "h"]);
    }

    #[tokio::test]
    async fn test_rebuild_after_mutation() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router.handle("/x", terminal(&log, "h"));
        assert_eq!(router.bindings().len(), 1);

        router.use_middleware(record(&log, "added"));
        router.handle("/y", terminal(&log, "h2"));

        let bindings = router.bindings();
        assert_eq!(bindings.len(), 2);
        invoke(&bindings, "/x").await;
        assert_eq!(*log.lock().unwrap(), ["added", "h"]);
    }

    #[tokio::test]
    async fn test_cloned_mount_binds_under_each_parent_chain() {
        let log: Log = Arc::default();
        let mut shared = Router::new();
        shared.use_middleware(record(&log, "shared"));
        shared.handle("/s", terminal(&log, "h"));

        let mut root = Router::new();
        root.group(|g| {
            g.use_middleware(record(&log, "first"));
            g.mount(shared.clone());
        });
        root.group(|g| {
            g.use_middleware(record(&log, "second"));
            g.mount(shared);
        });

        let bindings = root.bindings();
        assert_eq!(bindings.len(), 2);

        bindings[1].handler.run(Request::new(Body::empty())).await;
        assert_eq!(*log.lock().unwrap(), ["second", "shared", "h"]);
    }

    #[test]
    fn test_mux_propagates_registration_error() {
        let mut root = Router::new();
        root.handle("GET /dup", Handler::new(|_req| async { "" }));
        root.group(|g| {
            g.handle("GET /dup", Handler::new(|_req| async { "" }));
        });

        let err = root.mux().unwrap_err();
        assert!(matches!(err, crate::Error::DuplicateRoute { .. }));
    }
}
