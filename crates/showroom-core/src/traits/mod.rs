//! Trait definitions implemented by the leaf crates.

pub mod cache;
pub mod media;

pub use cache::CacheProvider;
pub use media::{MediaStore, UploadedMedia};
