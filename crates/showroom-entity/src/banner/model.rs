//! Banner entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::fmt;
use uuid::Uuid;

use super::image::BannerImage;

/// Site placement a banner belongs to. At most one banner per kind is
/// active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "banner_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    /// Landing page.
    Home,
    /// News section.
    News,
    /// Used vehicles section.
    Used,
    /// Experience section.
    Experience,
    /// About-us section.
    Us,
    /// Accessories section.
    Accessories,
    /// Vehicles section.
    Vehicles,
}

impl BannerKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::News => "news",
            Self::Used => "used",
            Self::Experience => "experience",
            Self::Us => "us",
            Self::Accessories => "accessories",
            Self::Vehicles => "vehicles",
        }
    }
}

impl fmt::Display for BannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A promotional banner with one image slot per device class.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Banner {
    /// Unique banner identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Target link the banner points at.
    pub link: String,
    /// Site placement.
    pub kind: BannerKind,
    /// Whether the banner is currently shown.
    pub is_active: bool,
    /// Image slots (JSONB column).
    pub images: Json<Vec<BannerImage>>,
    /// When the banner was created.
    pub created_at: DateTime<Utc>,
    /// When the banner was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Banner {
    /// The image slots attached to this banner.
    pub fn images(&self) -> &[BannerImage] {
        &self.images.0
    }
}

/// Data required to create a new banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBanner {
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Site placement.
    pub kind: BannerKind,
    /// Whether the banner starts active.
    pub is_active: bool,
    /// Initial image slots (placeholder paths, staged sources).
    pub images: Vec<BannerImage>,
}

/// Full business-field update of a banner (synchronous path only; the
/// pipeline worker patches images through its own field-scoped write).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBanner {
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Site placement.
    pub kind: BannerKind,
    /// Whether the banner is shown.
    pub is_active: bool,
    /// Replacement image slots.
    pub images: Vec<BannerImage>,
}
