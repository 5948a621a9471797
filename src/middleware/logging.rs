//! Request logging middleware.

use std::time::Instant;

use axum::extract::Request;

use crate::http::RequestExt;
use crate::middleware::Middleware;
use crate::routing::Handler;

/// Log one structured event per request: method, path, status and latency.
///
/// When a `RequestId` is attached (see [`request_id`](super::request_id)) it
/// is included, so place this inside `request_id` in the chain.
pub fn log_requests() -> impl Middleware + Clone {
    |next: Handler| {
        Handler::new(move |req: Request| {
            let next = next.clone();
            async move {
                let start = Instant::now();
                let method = req.method().clone();
                let path = req.uri().path().to_string();
                let version = req.version();
                let request_id = req.request_id().map(|id| id.to_string());

                let res = next.run(req).await;

                tracing::info!(
                    request_id = request_id.as_deref().unwrap_or("-"),
                    method = %method,
                    path = %path,
                    version = ?version,
                    status = res.status().as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Request handled"
                );
                res
            }
        })
    }
}
