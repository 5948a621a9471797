//! Error types for route-tree.
//!
//! The route tree itself never fails. Every error here originates in the
//! dispatch primitive (pattern registration) or in the ambient stack
//! (configuration, I/O).

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Result type alias for route-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while registering routes or running the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Pattern is not of the form `[METHOD ]/path`.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    /// Method prefix is not a valid HTTP method token.
    #[error("invalid method {method:?} in pattern {pattern:?}")]
    InvalidMethod { pattern: String, method: String },

    /// The same method and path were registered twice.
    #[error("route already registered: {pattern}")]
    DuplicateRoute { pattern: String },

    /// The path conflicts with a previously registered path.
    #[error("conflicting pattern {pattern:?}: {source}")]
    Conflict {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error from the listener or server.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
