//! Category orchestration service.

pub mod projection;
pub mod service;

pub use service::{CategoryListing, CategoryService, CreateCategoryRequest, UpdateCategoryRequest};
