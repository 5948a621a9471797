//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, StatusCode};
use route_tree::{Handler, Middleware, Mux};

/// A response reduced to the parts tests assert on.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Dispatch a request through a built mux.
pub async fn send(mux: &Mux, method: Method, path: &str, headers: &[(&str, &str)]) -> TestResponse {
    let mut builder = axum::http::Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Body::empty()).unwrap();

    let res = mux.dispatch(req).await;
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// `GET` with no extra headers.
pub async fn get(mux: &Mux, path: &str) -> TestResponse {
    send(mux, Method::GET, path, &[]).await
}

/// Shared log of middleware entries, in the order requests reach them.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    /// Middleware recording `name` before running the wrapped handler.
    pub fn record(&self, name: &str) -> impl Middleware + Clone {
        let log = self.0.clone();
        let name = name.to_string();
        move |next: Handler| {
            let log = log.clone();
            let name = name.clone();
            Handler::new(move |req| {
                log.lock().unwrap().push(name.clone());
                next.run(req)
            })
        }
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}
