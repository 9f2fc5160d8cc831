use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

/// Graceful shutdown coordinator for Dugout.
///
/// Commands run their store calls inside [`ShutdownHandle::scope`]; when the
/// operator interrupts, the scoped future is dropped and any in-flight
/// request is abandoned with it instead of running on past its owner.
pub struct ShutdownCoordinator {
    trigger: watch::Sender<bool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (trigger, _) = watch::channel(false);
        Self { trigger }
    }

    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            rx: self.trigger.subscribe(),
        }
    }

    /// Flip every handle to cancelled.
    pub fn trigger(&self) {
        let _ = self.trigger.send(true);
    }

    /// Install a SIGINT handler that triggers shutdown.
    pub fn install_signal_handlers(&self) -> Result<()> {
        info!("Installing signal handlers for graceful shutdown");
        let trigger = self.trigger.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, shutting down");
                    let _ = trigger.send(true);
                }
                Err(e) => warn!("Failed to listen for interrupt signal: {}", e),
            }
        });
        Ok(())
    }

    /// Log final statistics and close out.
    pub fn finalize(&self) {
        crate::observability::store_metrics().log_stats();
        info!("Graceful shutdown completed successfully");
    }
}

/// A cheap, cloneable view of the shutdown state.
#[derive(Clone)]
pub struct ShutdownHandle {
    rx: watch::Receiver<bool>,
}

impl ShutdownHandle {
    pub fn is_shutting_down(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been triggered. Never resolves if the
    /// coordinator goes away without triggering.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
        std::future::pending::<()>().await
    }

    /// Run `fut` until it finishes or shutdown is triggered. Returns `None`
    /// when cancelled; the future is dropped at that point.
    pub async fn scope<F>(&self, fut: F) -> Option<F::Output>
    where
        F: std::future::Future,
    {
        tokio::select! {
            out = fut => Some(out),
            _ = self.cancelled() => None,
        }
    }
}
