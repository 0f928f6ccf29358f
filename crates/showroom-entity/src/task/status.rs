//! Task status and kind enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a media task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting to be picked up by the worker (possibly delayed by backoff).
    Pending,
    /// Currently being processed.
    Running,
    /// Successfully completed.
    Completed,
    /// Failed after exhausting all attempts.
    Failed,
}

impl TaskStatus {
    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a media task does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Upload one staged file and patch the owning entity's icon field.
    UploadSingle,
    /// Upload every pending image slot and persist the full slot list.
    UploadMany,
    /// Delete a remote object by its public URL.
    Delete,
}

impl TaskKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UploadSingle => "upload_single",
            Self::UploadMany => "upload_many",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
