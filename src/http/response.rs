//! Response helpers shared by handlers, middleware and the mux.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Plain-text error response whose body is the status reason phrase
/// followed by a newline, e.g. `"Unauthorized\n"`.
pub fn error(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    plain_text(status, reason)
}

fn plain_text(status: StatusCode, message: &str) -> Response {
    let mut res = (status, format!("{message}\n")).into_response();
    let headers = res.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    res
}
