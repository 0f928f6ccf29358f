//! # showroom-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all Showroom entities. The `media_tasks` table is
//! also the durable backend of the pipeline's task queue.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
