//! Banner orchestration service.

pub mod service;

pub use service::{BannerFiles, BannerService, CreateBannerRequest, UpdateBannerRequest};
