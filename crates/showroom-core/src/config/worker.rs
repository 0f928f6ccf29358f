//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Media task worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Logical queue channel this worker drains.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Number of concurrent task processing slots. Relative ordering of
    /// tasks enqueued together is only preserved with a single slot.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between task queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Interval in seconds between terminal-task sweeps (0 disables).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Hours to retain completed/failed tasks before the sweeper purges them.
    #[serde(default = "default_retention")]
    pub retention_hours: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            queue: default_queue(),
            concurrency: default_concurrency(),
            poll_interval_seconds: default_poll_interval(),
            sweep_interval_seconds: default_sweep_interval(),
            retention_hours: default_retention(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_queue() -> String {
    "media".to_string()
}

fn default_concurrency() -> usize {
    1
}

fn default_poll_interval() -> u64 {
    2
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_retention() -> i64 {
    72
}
