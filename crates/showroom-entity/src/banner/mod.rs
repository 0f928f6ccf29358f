//! Banner entity: a promotional slot with one image per device class.

pub mod image;
pub mod model;

pub use image::{BannerImage, ImageKind};
pub use model::{Banner, BannerKind, CreateBanner, UpdateBanner};
