//! Composable route trees over an HTTP multiplexer.
//!
//! Declare routes on a [`Router`], layer middleware with
//! [`Router::use_middleware`], organize routes with [`Router::group`] and
//! [`Router::mount`], then flatten the tree into a [`Mux`] whose handlers are
//! wrapped in the right order: ancestor middleware outermost, a node's own
//! middleware innermost, the route handler last.
//!
//! ```
//! use axum::http::{HeaderName, HeaderValue};
//! use route_tree::{middleware, Router};
//!
//! let mut router = Router::new();
//! router.use_middleware(middleware::log_requests());
//! router.handle_fn("GET /hello", |_req| async { "world!" });
//! router.group(|g| {
//!     g.use_middleware(middleware::set_header(
//!         HeaderName::from_static("x-custom"),
//!         HeaderValue::from_static("true"),
//!     ));
//!     g.handle_fn("GET /custom-header", |_req| async { "Check response headers!" });
//! });
//!
//! let mux = router.into_mux().unwrap();
//! assert_eq!(mux.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use middleware::Middleware;
pub use routing::{Binding, Dispatcher, Handler, Mux, Next, Router};
