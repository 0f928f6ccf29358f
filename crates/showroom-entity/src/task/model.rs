//! Media task row model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{TaskKind, TaskStatus};

/// A durable media task.
///
/// The row doubles as the enqueue handle: its `id` is used for
/// logging/correlation only, never for idempotency.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaTask {
    /// Unique task identifier.
    pub id: Uuid,
    /// What the task does.
    pub kind: TaskKind,
    /// Logical queue channel.
    pub queue: String,
    /// Kind-specific payload body (JSONB).
    pub payload: serde_json::Value,
    /// Error message from the last failed attempt.
    pub error_message: Option<String>,
    /// Current task status.
    pub status: TaskStatus,
    /// Number of execution attempts so far (incremented at claim time).
    pub attempts: i32,
    /// Maximum allowed attempts.
    pub max_attempts: i32,
    /// Fixed delay in milliseconds between attempts.
    pub backoff_ms: i64,
    /// Earliest time the task may be claimed (None = immediately).
    pub scheduled_at: Option<DateTime<Utc>>,
    /// When the current attempt started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
    /// Worker that claimed the task.
    pub worker_id: Option<String>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl MediaTask {
    /// Whether another attempt is allowed after a failure.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

/// Data required to create a new media task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMediaTask {
    /// What the task does.
    pub kind: TaskKind,
    /// Logical queue channel.
    pub queue: String,
    /// Kind-specific payload body.
    pub payload: serde_json::Value,
    /// Maximum allowed attempts.
    pub max_attempts: i32,
    /// Fixed delay in milliseconds between attempts.
    pub backoff_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(attempts: i32, max_attempts: i32) -> MediaTask {
        let now = Utc::now();
        MediaTask {
            id: Uuid::new_v4(),
            kind: TaskKind::Delete,
            queue: "media".into(),
            payload: serde_json::json!({}),
            error_message: None,
            status: TaskStatus::Running,
            attempts,
            max_attempts,
            backoff_ms: 5000,
            scheduled_at: None,
            started_at: Some(now),
            completed_at: None,
            worker_id: Some("worker-1".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn retry_allowed_until_attempts_exhausted() {
        assert!(task(1, 3).can_retry());
        assert!(task(2, 3).can_retry());
        assert!(!task(3, 3).can_retry());
    }
}
