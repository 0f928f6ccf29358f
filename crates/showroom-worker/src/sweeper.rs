//! Periodic purge of terminal task rows.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use showroom_database::repositories::task::TaskRepository;

/// Interval loop that deletes completed/failed tasks older than the
/// retention window. Keeps the queue table from growing without bound;
/// failed rows stay visible for the whole window for debugging.
#[derive(Debug)]
pub struct TaskSweeper {
    repo: Arc<TaskRepository>,
    interval_seconds: u64,
    retention_hours: i64,
}

impl TaskSweeper {
    /// Create a new sweeper.
    pub fn new(repo: Arc<TaskRepository>, interval_seconds: u64, retention_hours: i64) -> Self {
        Self {
            repo,
            interval_seconds,
            retention_hours,
        }
    }

    /// Run until the cancel signal is received. A zero interval disables
    /// the sweeper entirely.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        if self.interval_seconds == 0 {
            tracing::info!("Task sweeper disabled");
            return;
        }

        tracing::info!(
            interval_seconds = self.interval_seconds,
            retention_hours = self.retention_hours,
            "Task sweeper started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let cutoff = Utc::now() - chrono::Duration::hours(self.retention_hours);
                    match self.repo.cleanup_terminal(cutoff).await {
                        Ok(0) => {}
                        Ok(removed) => {
                            tracing::info!(removed, "Purged terminal tasks");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Task sweep failed");
                        }
                    }
                }
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!("Task sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }
}
