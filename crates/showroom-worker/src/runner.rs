//! Worker runner — main loop that polls the queue and executes tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use showroom_core::config::worker::WorkerConfig;
use showroom_entity::task::MediaTask;

use crate::processor::{TaskExecutionError, TaskHandler};
use crate::queue::TaskQueue;

/// What to do with a task after a failed attempt.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FailureAction {
    /// Reschedule after the task's fixed backoff delay.
    Retry { delay_ms: i64 },
    /// Mark failed; only a log record remains.
    Fail,
}

/// Decide between retry and terminal failure.
///
/// The attempt counter was already incremented when the task was claimed,
/// so `attempts == max_attempts` means the final attempt just ran.
pub(crate) fn failure_action(task: &MediaTask, err: &TaskExecutionError) -> FailureAction {
    match err {
        TaskExecutionError::Transient(_) if task.can_retry() => FailureAction::Retry {
            delay_ms: task.backoff_ms,
        },
        _ => FailureAction::Fail,
    }
}

/// Main worker runner.
///
/// Exactly one handler is bound per queue instance. The default
/// concurrency of 1 drains the queue FIFO-ish; that ordering is an
/// implementation detail, never a caller-visible guarantee. A task
/// failure only affects that task — other queued tasks keep making
/// progress.
#[derive(Debug)]
pub struct WorkerRunner {
    /// Task queue to poll.
    queue: Arc<TaskQueue>,
    /// The single handler processing claimed tasks.
    handler: Arc<dyn TaskHandler>,
    /// Worker configuration.
    config: WorkerConfig,
    /// Worker identifier (logging only).
    worker_id: String,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(
        queue: Arc<TaskQueue>,
        handler: Arc<dyn TaskHandler>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            handler,
            config,
            worker_id,
        }
    }

    /// Start the runner — runs until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            worker_id = %self.worker_id,
            queue = %self.queue.channel(),
            concurrency = self.config.concurrency,
            poll_interval = self.config.poll_interval_seconds,
            "Worker started"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.concurrency.max(1)));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!(worker_id = %self.worker_id, "Worker received shutdown signal");
                        break;
                    }
                }
                _ = self.poll_and_execute(&semaphore) => {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                tracing::info!(worker_id = %self.worker_id, "Worker shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!(
            worker_id = %self.worker_id,
            "Worker waiting for in-flight tasks to complete..."
        );

        let max_permits = self.config.concurrency.max(1) as u32;
        let _ =
            tokio::time::timeout(Duration::from_secs(30), semaphore.acquire_many(max_permits)).await;

        tracing::info!(worker_id = %self.worker_id, "Worker shut down complete");
    }

    /// Poll for a task and execute it if available.
    async fn poll_and_execute(&self, semaphore: &Arc<tokio::sync::Semaphore>) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::trace!("All worker slots occupied, waiting...");
                return;
            }
        };

        match self.queue.dequeue().await {
            Ok(Some(task)) => {
                let queue = Arc::clone(&self.queue);
                let handler = Arc::clone(&self.handler);

                tokio::spawn(async move {
                    let _permit = permit;

                    tracing::info!(
                        task_id = %task.id,
                        kind = %task.kind,
                        attempt = task.attempts,
                        max_attempts = task.max_attempts,
                        "Processing task"
                    );

                    match handler.handle(&task).await {
                        Ok(()) => {
                            if let Err(e) = queue.complete(task.id).await {
                                tracing::error!(task_id = %task.id, error = %e, "Failed to mark task completed");
                            }
                            tracing::info!(task_id = %task.id, "Task completed successfully");
                        }
                        Err(err) => {
                            let message = err.to_string();
                            match failure_action(&task, &err) {
                                FailureAction::Retry { delay_ms } => {
                                    tracing::warn!(
                                        task_id = %task.id,
                                        attempt = task.attempts,
                                        delay_ms,
                                        error = %message,
                                        "Task failed, retrying after backoff"
                                    );
                                    if let Err(e) =
                                        queue.retry_after(task.id, delay_ms, &message).await
                                    {
                                        tracing::error!(task_id = %task.id, error = %e, "Failed to reschedule task");
                                    }
                                }
                                FailureAction::Fail => {
                                    tracing::error!(
                                        task_id = %task.id,
                                        attempt = task.attempts,
                                        error = %message,
                                        "Task failed terminally"
                                    );
                                    if let Err(e) = queue.fail(task.id, &message).await {
                                        tracing::error!(task_id = %task.id, error = %e, "Failed to mark task failed");
                                    }
                                }
                            }
                        }
                    }
                });
            }
            Ok(None) => {
                drop(permit);
                tracing::trace!("No tasks available in queue");
            }
            Err(e) => {
                drop(permit);
                tracing::error!(error = %e, "Failed to dequeue task");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use serde_json::json;
    use showroom_entity::task::{TaskKind, TaskStatus};
    use uuid::Uuid;

    fn task_with_attempts(attempts: i32) -> MediaTask {
        let now = Utc::now();
        MediaTask {
            id: Uuid::new_v4(),
            kind: TaskKind::Delete,
            queue: "media".into(),
            payload: json!({}),
            error_message: None,
            status: TaskStatus::Running,
            attempts,
            max_attempts: 3,
            backoff_ms: 5000,
            scheduled_at: None,
            started_at: Some(now),
            completed_at: None,
            worker_id: Some("w".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn transient_failures_retry_with_the_fixed_backoff() {
        let err = TaskExecutionError::Transient("store down".into());
        assert_eq!(
            failure_action(&task_with_attempts(1), &err),
            FailureAction::Retry { delay_ms: 5000 }
        );
        assert_eq!(
            failure_action(&task_with_attempts(2), &err),
            FailureAction::Retry { delay_ms: 5000 }
        );
    }

    #[test]
    fn the_third_attempt_is_the_last() {
        let err = TaskExecutionError::Transient("store down".into());
        assert_eq!(failure_action(&task_with_attempts(3), &err), FailureAction::Fail);
    }

    #[test]
    fn permanent_failures_never_retry() {
        let err = TaskExecutionError::Permanent("bad payload".into());
        assert_eq!(failure_action(&task_with_attempts(1), &err), FailureAction::Fail);
    }
}
