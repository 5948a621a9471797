//! Request ID middleware.

use axum::extract::Request;
use axum::http::HeaderValue;

use crate::http::{RequestId, X_REQUEST_ID};
use crate::middleware::Middleware;
use crate::routing::Handler;

/// Attach a [`RequestId`] to every request and echo it in `x-request-id`.
///
/// An inbound `x-request-id` header is reused when it is valid UTF-8 and
/// non-empty; otherwise a UUID v4 is generated.
pub fn request_id() -> impl Middleware + Clone {
    |next: Handler| {
        Handler::new(move |mut req: Request| {
            let next = next.clone();
            async move {
                let id = req
                    .headers()
                    .get(&X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty())
                    .map(RequestId::new)
                    .unwrap_or_else(RequestId::generate);

                req.extensions_mut().insert(id.clone());
                let mut res = next.run(req).await;

                if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                    res.headers_mut().insert(X_REQUEST_ID.clone(), value);
                }
                res
            }
        })
    }
}
