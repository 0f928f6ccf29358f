//! # showroom-media
//!
//! Remote media store client implementations for Showroom, plus the local
//! staging area the pipeline cleans up after successful pushes.
//!
//! The [`MediaStore`](showroom_core::traits::MediaStore) trait lives in
//! `showroom-core`; this crate provides the HTTP CDN implementation and an
//! in-memory double for tests. Implementations never retry — retry policy
//! belongs to the task queue layer.

pub mod cdn;
pub mod memory;
pub mod public_id;
pub mod staging;

pub use cdn::CdnMediaStore;
pub use memory::InMemoryMediaStore;
pub use staging::StagingArea;
