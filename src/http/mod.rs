//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, timeout + trace layers)
//!     → MuxService (pattern + method match, path params attached)
//!     → bound handler: route tree middleware chain → terminal handler
//!     → response.rs helpers for error bodies
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{PathParams, RequestExt, RequestId, X_REQUEST_ID};
pub use server::HttpServer;
