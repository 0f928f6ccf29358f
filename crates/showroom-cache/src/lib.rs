//! # showroom-cache
//!
//! Cache provider implementations for Showroom. Supports two modes:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration. The cache is
//! a best-effort accelerator for listing queries: callers swallow cache
//! errors so a down backend never breaks the primary read/write path.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
