//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! route tree build      → debug event per binding, info summary
//! mux                   → debug events for 404 / 405
//! log_requests layer    → info event per request (method, path, status, latency)
//! request_id layer      → request ID carried on every request event
//!     → logging.rs (tracing subscriber, stdout)
//! ```
//!
//! # Design Decisions
//! - Structured key-value events via the tracing crate
//! - Request ID flows through all middleware as a typed extension
//! - `RUST_LOG` overrides the configured level

pub mod logging;
