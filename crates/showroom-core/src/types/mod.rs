//! Core type definitions used across the Showroom workspace.

pub mod pagination;
pub mod sorting;

pub use pagination::{PageRequest, PageResponse};
pub use sorting::SortDirection;
