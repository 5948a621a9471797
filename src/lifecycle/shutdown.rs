//! Shutdown coordination.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Latches a single "stop serving" state shared by every server and task
/// holding a clone.
///
/// The state is sticky: a subscriber created after `trigger` still observes
/// it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to the shutdown state.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// A future that resolves once shutdown is triggered (or the coordinator
    /// is dropped), suitable for `with_graceful_shutdown`.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.wait_for(|triggered| *triggered).await;
        }
    }

    /// Trigger shutdown.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
        tracing::info!(receivers = self.tx.receiver_count(), "Shutdown triggered");
    }

    /// Trigger shutdown when the process receives SIGINT or SIGTERM.
    pub fn trigger_on_signal(&self) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            super::signals::wait_for_signal().await;
            this.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
