//! Task queue abstraction over the durable `media_tasks` table.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use showroom_core::result::AppResult;
use showroom_database::repositories::task::TaskRepository;
use showroom_entity::task::{CreateMediaTask, MediaTask, TaskPayload, TaskStatus};

/// Retry options supplied at enqueue time.
///
/// The policy is fixed and non-exponential with no jitter. This is
/// intentional; do not "improve" it without a requirement change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryOptions {
    /// Maximum total attempts (first run included).
    pub max_attempts: i32,
    /// Fixed delay in milliseconds between attempts.
    pub backoff_ms: i64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 5000,
        }
    }
}

/// Task queue for enqueuing and claiming media work.
///
/// Enqueuing is fire-and-continue: the returned row is only a handle for
/// logging/correlation, and processing happens later on the worker side.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    /// Task repository for database persistence.
    repo: Arc<TaskRepository>,
    /// Logical queue channel this instance serves.
    queue: String,
    /// Worker identifier used when claiming tasks.
    worker_id: String,
}

impl TaskQueue {
    /// Create a new task queue over a logical channel.
    pub fn new(repo: Arc<TaskRepository>, queue: impl Into<String>, worker_id: impl Into<String>) -> Self {
        Self {
            repo,
            queue: queue.into(),
            worker_id: worker_id.into(),
        }
    }

    /// The logical channel this queue serves.
    pub fn channel(&self) -> &str {
        &self.queue
    }

    /// Enqueue a new task. Returns before any processing happens.
    pub async fn enqueue(&self, payload: &TaskPayload, options: RetryOptions) -> AppResult<MediaTask> {
        let task = self
            .repo
            .create(&CreateMediaTask {
                kind: payload.kind(),
                queue: self.queue.clone(),
                payload: payload.to_value()?,
                max_attempts: options.max_attempts,
                backoff_ms: options.backoff_ms,
            })
            .await?;

        tracing::debug!(
            task_id = %task.id,
            kind = %task.kind,
            queue = %task.queue,
            "Task enqueued"
        );

        Ok(task)
    }

    /// Claim the next runnable task, if any.
    pub async fn dequeue(&self) -> AppResult<Option<MediaTask>> {
        let task = self.repo.claim_next(&self.queue, &self.worker_id).await?;
        if let Some(task) = &task {
            tracing::debug!(
                task_id = %task.id,
                kind = %task.kind,
                attempt = task.attempts,
                "Task claimed"
            );
        }
        Ok(task)
    }

    /// Mark a task as completed successfully.
    pub async fn complete(&self, task_id: Uuid) -> AppResult<()> {
        self.repo.mark_completed(task_id).await?;
        tracing::debug!(task_id = %task_id, "Task completed");
        Ok(())
    }

    /// Mark a task as failed. Failures are only logged; there is no
    /// dead-letter rerouting and the enqueuing caller has long since
    /// returned.
    pub async fn fail(&self, task_id: Uuid, error: &str) -> AppResult<()> {
        self.repo.mark_failed(task_id, error).await?;
        tracing::debug!(task_id = %task_id, error, "Task marked failed");
        Ok(())
    }

    /// Reschedule a failed attempt after the task's fixed backoff delay.
    pub async fn retry_after(&self, task_id: Uuid, delay_ms: i64, error: &str) -> AppResult<()> {
        self.repo.retry_after(task_id, delay_ms, error).await?;
        tracing::debug!(task_id = %task_id, delay_ms, "Task rescheduled");
        Ok(())
    }

    /// Get queue statistics.
    pub async fn stats(&self) -> AppResult<QueueStats> {
        Ok(QueueStats {
            pending: self.repo.count_by_status(TaskStatus::Pending).await?,
            running: self.repo.count_by_status(TaskStatus::Running).await?,
            failed: self.repo.count_by_status(TaskStatus::Failed).await?,
            worker_id: self.worker_id.clone(),
        })
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of pending tasks.
    pub pending: i64,
    /// Number of running tasks.
    pub running: i64,
    /// Number of failed tasks.
    pub failed: i64,
    /// Current worker identifier.
    pub worker_id: String,
}
