//! # showroom-service
//!
//! Business logic service layer for Showroom. Each service orchestrates
//! repositories, the listing cache, and the media task queue to implement
//! application-level use cases: entities are created and updated
//! synchronously with placeholder image paths, media tasks are enqueued
//! for the pipeline worker, and every mutation drops the entity type's
//! listing cache namespace.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod banner;
pub mod cached;
pub mod category;

pub use banner::BannerService;
pub use category::CategoryService;
