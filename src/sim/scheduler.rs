//! Background tick driver.
//!
//! Runs a generation sweep over every match on a fixed interval, whether
//! or not any consumer is connected. A subscriber arriving late still
//! observes state consistent with elapsed wall time.

use crate::sim::Simulation;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

pub struct TickScheduler {
    sim: Arc<Simulation>,
    tick_interval: Duration,
}

impl TickScheduler {
    pub fn new(sim: Arc<Simulation>, tick_interval: Duration) -> Self {
        Self { sim, tick_interval }
    }

    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            info!("tick scheduler running every {:?}", self.tick_interval);
            let mut ticker = interval(self.tick_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let generated = self.sim.advance_all().await;
                        if generated > 0 {
                            debug!(generated, "tick complete");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("tick scheduler stopped");
        });
        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running scheduler. Stopping waits for any in-flight sweep
/// to finish committing.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
