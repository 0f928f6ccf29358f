//! # showroom-core
//!
//! Core crate for Showroom. Contains traits, configuration schemas,
//! pagination/sorting types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Showroom crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
