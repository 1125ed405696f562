use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::AppError;
use crate::services::controller::{LoadStats, ScheduleController};

/// Periodically re-reads the document store into local state.
pub struct ReloadScheduler {
    controller: Arc<ScheduleController>,
    interval: Duration,
}

impl ReloadScheduler {
    pub fn new(controller: Arc<ScheduleController>, interval_secs: u64) -> Self {
        Self {
            controller,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs forever; failed reloads are logged and retried on the next tick.
    pub async fn start(self) {
        info!("Starting reload scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.run_once().await {
                Ok(stats) => {
                    info!(
                        "Reload completed - {} subjects, {} assignments",
                        stats.subjects, stats.assignments
                    );
                }
                Err(e) => {
                    warn!("Reload failed: {}", e);
                }
            }
        }
    }

    pub async fn run_once(&self) -> Result<LoadStats, AppError> {
        self.controller.load().await
    }
}
