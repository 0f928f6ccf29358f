//! Typed media task payloads.
//!
//! Each task row stores its kind in a dedicated column and the variant
//! body as JSONB. [`TaskPayload`] reunites the two so the processor can
//! dispatch with an exhaustive match instead of branching on strings.
//!
//! A payload must carry enough information to locate and mutate the owning
//! entity without re-querying caller context: the worker runs long after
//! the request that enqueued it has returned.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use showroom_core::{AppError, AppResult};

use super::status::TaskKind;
use crate::banner::BannerImage;

/// The entity types that own media assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A promotional banner.
    Banner,
    /// A content category.
    Category,
}

impl EntityKind {
    /// Remote store folder this entity type uploads into.
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Banner => "banners",
            Self::Category => "categories",
        }
    }

    /// Local staging path prefix for this entity type's uploads.
    pub fn staging_prefix(&self) -> &'static str {
        match self {
            Self::Banner => "/banners/",
            Self::Category => "/categories/",
        }
    }

    /// Cache namespace holding this entity type's listing entries.
    pub fn cache_namespace(&self) -> &'static str {
        match self {
            Self::Banner => "banners",
            Self::Category => "categories",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder())
    }
}

/// Reference to the entity a task mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity type.
    pub kind: EntityKind,
    /// Entity primary key.
    pub id: Uuid,
}

/// A file the HTTP layer staged on local disk for later upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    /// Full local path of the staged file.
    pub path: String,
    /// Original file name (used to build placeholder paths and cleanup paths).
    pub filename: String,
}

/// Payload of an `upload_single` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSinglePayload {
    /// Entity whose icon field receives the uploaded URL.
    pub entity: EntityRef,
    /// The staged file to push.
    pub file: StagedFile,
    /// Destination folder on the remote store.
    pub folder: String,
    /// Staging prefix to clean up after the push.
    pub staging_prefix: String,
}

/// Payload of an `upload_many` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadManyPayload {
    /// Entity whose image list is replaced after the pushes.
    pub entity: EntityRef,
    /// Image slots; slots with a `src` are uploaded, others pass through.
    pub images: Vec<BannerImage>,
    /// Destination folder on the remote store.
    pub folder: String,
    /// Staging prefix to clean up after each push.
    pub staging_prefix: String,
}

/// Payload of a `delete` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePayload {
    /// Public URL of the remote object to delete.
    pub url: String,
    /// Folder the object was uploaded into (logging/correlation only).
    pub folder: String,
}

/// The typed union of all media task payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPayload {
    /// Upload one staged file and patch the entity's icon field.
    UploadSingle(UploadSinglePayload),
    /// Upload pending image slots and persist the full slot list.
    UploadMany(UploadManyPayload),
    /// Delete a remote object by URL; no entity write-back.
    Delete(DeletePayload),
}

impl TaskPayload {
    /// The kind column value for this payload.
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::UploadSingle(_) => TaskKind::UploadSingle,
            Self::UploadMany(_) => TaskKind::UploadMany,
            Self::Delete(_) => TaskKind::Delete,
        }
    }

    /// Serialize the variant body for the JSONB payload column.
    pub fn to_value(&self) -> AppResult<serde_json::Value> {
        let value = match self {
            Self::UploadSingle(body) => serde_json::to_value(body)?,
            Self::UploadMany(body) => serde_json::to_value(body)?,
            Self::Delete(body) => serde_json::to_value(body)?,
        };
        Ok(value)
    }

    /// Rebuild the typed payload from a task row's kind and JSONB body.
    pub fn from_parts(kind: TaskKind, value: &serde_json::Value) -> AppResult<Self> {
        let payload = match kind {
            TaskKind::UploadSingle => Self::UploadSingle(
                serde_json::from_value(value.clone())
                    .map_err(|e| malformed_payload(kind, &e))?,
            ),
            TaskKind::UploadMany => Self::UploadMany(
                serde_json::from_value(value.clone())
                    .map_err(|e| malformed_payload(kind, &e))?,
            ),
            TaskKind::Delete => Self::Delete(
                serde_json::from_value(value.clone())
                    .map_err(|e| malformed_payload(kind, &e))?,
            ),
        };
        Ok(payload)
    }
}

fn malformed_payload(kind: TaskKind, err: &serde_json::Error) -> AppError {
    AppError::new(
        showroom_core::error::ErrorKind::Serialization,
        format!("Malformed {kind} payload: {err}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::ImageKind;

    #[test]
    fn payload_round_trips_through_row_columns() {
        let payload = TaskPayload::UploadSingle(UploadSinglePayload {
            entity: EntityRef {
                kind: EntityKind::Category,
                id: Uuid::new_v4(),
            },
            file: StagedFile {
                path: "/tmp/staging/categories/a.png".into(),
                filename: "a.png".into(),
            },
            folder: "categories".into(),
            staging_prefix: "/categories/".into(),
        });

        let value = payload.to_value().unwrap();
        let parsed = TaskPayload::from_parts(payload.kind(), &value).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn image_slots_serialize_with_type_tag() {
        let payload = TaskPayload::UploadMany(UploadManyPayload {
            entity: EntityRef {
                kind: EntityKind::Banner,
                id: Uuid::new_v4(),
            },
            images: vec![BannerImage::staged(
                "/banners/hero.png".into(),
                ImageKind::Desktop,
                "/tmp/staging/banners/hero.png".into(),
            )],
            folder: "banners".into(),
            staging_prefix: "/banners/".into(),
        });

        let value = payload.to_value().unwrap();
        assert_eq!(value["images"][0]["type"], "desktop");
        assert_eq!(value["images"][0]["src"], "/tmp/staging/banners/hero.png");
    }

    #[test]
    fn wrong_body_for_kind_is_rejected() {
        let delete_body = serde_json::json!({ "url": "https://cdn/x.png", "folder": "banners" });
        let err = TaskPayload::from_parts(TaskKind::UploadSingle, &delete_body).unwrap_err();
        assert_eq!(err.kind, showroom_core::error::ErrorKind::Serialization);
    }
}
