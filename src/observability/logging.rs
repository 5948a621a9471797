//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config and environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` takes precedence over `observability.log_level`
//! - Safe to call more than once (later calls are no-ops), which keeps tests
//!   that share a process from fighting over the global subscriber

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter_directive()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(config.ansi))
        .try_init()
        .is_ok()
}

impl ObservabilityConfig {
    /// Filter directive for this crate and its HTTP stack.
    ///
    /// A bare level such as `debug` is scoped to `route_tree` and
    /// `tower_http`; anything else is used verbatim.
    pub fn filter_directive(&self) -> String {
        let level = self.log_level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("route_tree={level},tower_http={level}")
        }
    }
}
