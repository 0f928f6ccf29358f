//! Media task repository: the durable queue backend.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use showroom_core::error::{AppError, ErrorKind};
use showroom_core::result::AppResult;
use showroom_entity::task::{CreateMediaTask, MediaTask, TaskStatus};

/// Repository for media task rows and queue operations.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a task by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MediaTask>> {
        sqlx::query_as::<_, MediaTask>("SELECT * FROM media_tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find task", e))
    }

    /// Persist a new task. The returned row is the enqueue handle.
    pub async fn create(&self, data: &CreateMediaTask) -> AppResult<MediaTask> {
        sqlx::query_as::<_, MediaTask>(
            "INSERT INTO media_tasks (kind, queue, payload, max_attempts, backoff_ms) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.kind)
        .bind(&data.queue)
        .bind(&data.payload)
        .bind(data.max_attempts)
        .bind(data.backoff_ms)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create task", e))
    }

    /// Claim the next runnable task from a queue.
    ///
    /// `FOR UPDATE SKIP LOCKED` lets parallel queue instances claim without
    /// blocking each other; `scheduled_at` gating is what makes the fixed
    /// retry backoff durable across restarts. The attempt counter is
    /// incremented here, at claim time.
    pub async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<MediaTask>> {
        sqlx::query_as::<_, MediaTask>(
            "UPDATE media_tasks SET status = 'running', started_at = NOW(), worker_id = $2, \
             attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                SELECT id FROM media_tasks \
                WHERE queue = $1 AND status = 'pending' \
                AND (scheduled_at IS NULL OR scheduled_at <= NOW()) \
                ORDER BY created_at ASC \
                FOR UPDATE SKIP LOCKED \
                LIMIT 1 \
             ) RETURNING *",
        )
        .bind(queue)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim task", e))
    }

    /// Mark a task as completed.
    pub async fn mark_completed(&self, task_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE media_tasks SET status = 'completed', completed_at = NOW(), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete task", e))?;
        Ok(())
    }

    /// Mark a task as failed (all attempts exhausted or permanent failure).
    pub async fn mark_failed(&self, task_id: Uuid, error_message: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE media_tasks SET status = 'failed', error_message = $2, \
             completed_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(task_id)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark task as failed", e))?;
        Ok(())
    }

    /// Reschedule a failed attempt: back to pending, runnable again after
    /// the given delay.
    pub async fn retry_after(
        &self,
        task_id: Uuid,
        delay_ms: i64,
        error_message: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE media_tasks SET status = 'pending', \
             scheduled_at = NOW() + ($2::bigint * INTERVAL '1 millisecond'), \
             error_message = $3, started_at = NULL, worker_id = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(task_id)
        .bind(delay_ms)
        .bind(error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reschedule task", e))?;
        Ok(())
    }

    /// Count tasks in a given status.
    pub async fn count_by_status(&self, status: TaskStatus) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM media_tasks WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tasks", e))
    }

    /// Delete terminal (completed/failed) tasks last updated before the cutoff.
    pub async fn cleanup_terminal(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM media_tasks WHERE status IN ('completed', 'failed') AND updated_at < $1",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cleanup tasks", e))?;
        Ok(result.rows_affected())
    }
}
