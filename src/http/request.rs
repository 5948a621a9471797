//! Typed request-scoped context.
//!
//! # Responsibilities
//! - Carry per-request values (request ID, path parameters) alongside the
//!   request through the handler chain
//! - Give handlers and middleware typed accessors for them
//!
//! # Design Decisions
//! - Values live in the request's `Extensions`, keyed by type, so two
//!   middleware can never collide on a string key and reads never need a
//!   downcast that can fail at runtime
//! - Application-specific context (an authenticated user, a tenant) follows
//!   the same pattern: define a type, `extensions_mut().insert(..)` it in a
//!   middleware, read it with `extensions().get::<T>()` downstream

use std::fmt;

use axum::extract::Request;
use axum::http::HeaderName;

/// Header carrying the request ID, inbound and outbound.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Unique identifier of a request, attached by the `request_id` middleware.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh UUID v4 identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path parameters captured by the mux for the matched pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub(crate) fn new(params: Vec<(String, String)>) -> Self {
        Self(params)
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Typed accessors for request-scoped context.
pub trait RequestExt {
    /// The request ID, if the `request_id` middleware ran.
    fn request_id(&self) -> Option<&RequestId>;

    /// A named path parameter from the matched pattern.
    fn path_param(&self, name: &str) -> Option<&str>;

    /// All captured path parameters.
    fn path_params(&self) -> Option<&PathParams>;
}

impl RequestExt for Request {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params().and_then(|params| params.get(name))
    }

    fn path_params(&self) -> Option<&PathParams> {
        self.extensions().get::<PathParams>()
    }
}
