//! Banner image slots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device class a banner image slot targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Desktop viewport.
    Desktop,
    /// Tablet viewport.
    Tablet,
    /// Mobile viewport.
    Mobile,
}

impl ImageKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One image attached to a banner.
///
/// Lifecycle: created by the synchronous path with `path` holding a
/// locally-served placeholder (`/banners/<filename>`) and `src` holding the
/// staged temp file; the pipeline worker replaces `path` with the permanent
/// remote URL and clears `src` once the upload completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerImage {
    /// Placeholder path before processing, permanent remote URL after.
    pub path: String,
    /// Device class this slot serves.
    #[serde(rename = "type")]
    pub kind: ImageKind,
    /// Staged local temp file still awaiting upload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl BannerImage {
    /// Create a slot pointing at a staged local file.
    pub fn staged(placeholder_path: String, kind: ImageKind, src: String) -> Self {
        Self {
            path: placeholder_path,
            kind,
            src: Some(src),
        }
    }

    /// Whether this slot still awaits an upload.
    pub fn is_pending(&self) -> bool {
        self.src.is_some()
    }
}
