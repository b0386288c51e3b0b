//! Periodic removal of lapsed revocation entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::RevocationRegistry;

/// Runs [`RevocationRegistry::sweep_expired`] on a fixed interval.
#[derive(Debug, Clone)]
pub struct RevocationSweeper {
    registry: Arc<dyn RevocationRegistry>,
    interval: Duration,
}

impl RevocationSweeper {
    /// Creates a sweeper. A zero interval is raised to one second.
    pub fn new(registry: Arc<dyn RevocationRegistry>, interval: Duration) -> Self {
        Self {
            registry,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// Run one sweep.
    pub fn run_once(&self) -> usize {
        let removed = self.registry.sweep_expired();
        if removed > 0 {
            info!(removed, remaining = self.registry.len(), "Swept lapsed revocations");
        } else {
            debug!("Revocation sweep found nothing to remove");
        }
        removed
    }

    /// Spawn the sweep loop. It stops when `shutdown` turns `true` or its
    /// sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once();
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Revocation sweeper stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}
