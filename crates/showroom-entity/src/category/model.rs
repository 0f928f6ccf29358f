//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// What a category groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "category_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Vehicle categories.
    Vehicle,
    /// Product categories.
    Product,
}

impl CategoryKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A content category with an optional icon image.
///
/// `icon` holds a locally-served placeholder path until the pipeline
/// worker uploads the staged file and patches in the permanent remote URL.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Icon URL (placeholder path or permanent remote URL); empty if none.
    pub icon: String,
    /// What this category groups.
    pub kind: CategoryKind,
    /// Whether the category is visible.
    pub is_active: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Business-field update of a category. The icon is patched separately
/// (placeholder by the synchronous path, final URL by the pipeline worker).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategory {
    /// Display name.
    pub name: String,
    /// What this category groups.
    pub kind: CategoryKind,
    /// Whether the category is visible.
    pub is_active: bool,
}

/// Data required to create a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Display name.
    pub name: String,
    /// Initial icon path (placeholder), empty if no icon was staged.
    #[serde(default)]
    pub icon: String,
    /// What this category groups.
    pub kind: CategoryKind,
    /// Whether the category starts active.
    pub is_active: bool,
}
