//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (single-threaded, before serving):
//!     Router::new()
//!     → use_middleware / handle / handle_fn / group / mount
//!
//! Build (once per tree):
//!     router.rs (pre-order walk, accumulate ancestor middleware)
//!     → wrap each route handler: m1(m2(..mk(h)..))
//!     → Dispatcher::register(pattern, bound handler)
//!     → mux.rs (path + method table) or Vec<Binding>
//!
//! Serving:
//!     Mux::into_service() → MuxService (tower::Service, cheap clone)
//!     → path match → method match → bound handler
//! ```
//!
//! # Design Decisions
//! - Tree is frozen while it is built (immutable borrow)
//! - Bound handlers share no mutable state across requests
//! - Pattern conflicts are the dispatcher's business, never the tree's

pub mod handler;
pub mod mux;
pub mod router;

pub use handler::{Handler, Next};
pub use mux::{Binding, Dispatcher, Mux, MuxService};
pub use router::Router;
