//! Durable media task queue and background processing for Showroom.
//!
//! This crate provides:
//! - A task queue over the `media_tasks` table (enqueue, claim, complete,
//!   fail, reschedule)
//! - The media task processor that uploads staged files to the remote
//!   store and writes the final URLs back onto the owning entity
//! - A worker runner that polls for and executes queued tasks with the
//!   fixed retry/backoff policy
//! - A sweeper that purges terminal tasks after a retention window

pub mod processor;
pub mod queue;
pub mod runner;
pub mod sweeper;

pub use processor::{
    EntityWriteBack, MediaTaskProcessor, RepositoryWriteBack, TaskExecutionError, TaskHandler,
};
pub use queue::{RetryOptions, TaskQueue};
pub use runner::WorkerRunner;
pub use sweeper::TaskSweeper;
