//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Serve a built `Mux` over a bound TCP listener
//! - Apply transport-level layers (request timeout, HTTP tracing)
//! - Drain in-flight requests on shutdown, bounded by a grace period

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::lifecycle::Shutdown;
use crate::routing::{Mux, MuxService};
use crate::Result;

/// HTTP server for a built route tree.
pub struct HttpServer {
    mux: MuxService,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server for the given mux.
    pub fn new(mux: Mux, config: ServerConfig) -> Self {
        Self {
            mux: mux.into_service(),
            config,
        }
    }

    /// Wrap the mux with the transport layers.
    #[allow(deprecated)]
    fn build_app(&self) -> axum::Router {
        axum::Router::new()
            .fallback_service(self.mux.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, then drain.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<()> {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let app = self.build_app();

        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.signalled())
            .into_future();

        let drain_started = shutdown.signalled();
        let deadline = async move {
            drain_started.await;
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            result = serve => result?,
            _ = deadline => {
                tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, dropping in-flight requests");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
