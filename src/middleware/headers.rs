//! Response header middleware.

use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::middleware::{from_layer, Middleware};

/// Set a response header on every response produced under this middleware.
///
/// The header is only written when the response does not already carry it,
/// so a value set further in (an inner middleware or the handler itself)
/// takes precedence. With `set_header` registered twice for one name, the
/// later registration wins.
pub fn set_header(name: HeaderName, value: HeaderValue) -> impl Middleware + Clone {
    from_layer(SetResponseHeaderLayer::if_not_present(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::header;

    use crate::routing::Handler;

    #[tokio::test]
    async fn test_set_header() {
        let mw = set_header(HeaderName::from_static("x-a"), HeaderValue::from_static("1"));
        let handler = mw.wrap(Handler::new(|_req| async { "body" }));

        let res = handler.run(Request::new(Body::empty())).await;
        assert_eq!(res.headers()["x-a"], "1");
    }

    #[tokio::test]
    async fn test_inner_set_header_wins() {
        let inner = set_header(HeaderName::from_static("x-a"), HeaderValue::from_static("inner"));
        let outer = set_header(HeaderName::from_static("x-a"), HeaderValue::from_static("outer"));
        let handler = outer.wrap(inner.wrap(Handler::new(|_req| async { "body" })));

        let res = handler.run(Request::new(Body::empty())).await;
        assert_eq!(res.headers()["x-a"], "inner");
    }

    #[tokio::test]
    async fn test_handler_header_is_kept() {
        let mw = set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let handler = mw.wrap(Handler::new(|_req| async {
            axum::Json(serde_json::json!({ "ok": true }))
        }));

        let res = handler.run(Request::new(Body::empty())).await;
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    }
}
