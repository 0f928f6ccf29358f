//! Banner CRUD with asynchronous media handling.
//!
//! Banners are persisted immediately with locally-served placeholder image
//! paths; the actual uploads happen later on the pipeline worker, which
//! patches the permanent URLs back onto the row.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use showroom_cache::{CacheManager, keys};
use showroom_core::error::AppError;
use showroom_core::result::AppResult;
use showroom_core::types::pagination::PageResponse;
use showroom_database::repositories::banner::{BannerListQuery, BannerRepository};
use showroom_entity::banner::{Banner, BannerImage, BannerKind, CreateBanner, ImageKind, UpdateBanner};
use showroom_entity::task::{
    DeletePayload, EntityKind, EntityRef, StagedFile, TaskPayload, UploadManyPayload,
};
use showroom_worker::{RetryOptions, TaskQueue};

use crate::cached::{LISTING_TTL, invalidate_namespace, read_through};

/// Staged files for a banner's image slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BannerFiles {
    /// Desktop slot file.
    pub desktop: Option<StagedFile>,
    /// Tablet slot file.
    pub tablet: Option<StagedFile>,
    /// Mobile slot file.
    pub mobile: Option<StagedFile>,
}

/// Request to create a new banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBannerRequest {
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Site placement.
    pub kind: BannerKind,
    /// Whether the banner starts active.
    pub is_active: bool,
}

/// Request to update a banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBannerRequest {
    /// Display name.
    pub name: String,
    /// Target link.
    pub link: String,
    /// Site placement.
    pub kind: BannerKind,
    /// Whether the banner is shown.
    pub is_active: bool,
}

/// Build a placeholder slot for a staged file.
fn staged_slot(file: &StagedFile, kind: ImageKind) -> BannerImage {
    BannerImage::staged(
        format!("{}{}", EntityKind::Banner.staging_prefix(), file.filename),
        kind,
        file.path.clone(),
    )
}

/// Build the full slot list for a new banner. All three device classes
/// are required.
fn build_slots(files: &BannerFiles) -> AppResult<Vec<BannerImage>> {
    let (Some(desktop), Some(tablet), Some(mobile)) =
        (&files.desktop, &files.tablet, &files.mobile)
    else {
        return Err(AppError::validation(
            "A banner requires all three images: desktop, tablet, and mobile",
        ));
    };

    Ok(vec![
        staged_slot(desktop, ImageKind::Desktop),
        staged_slot(mobile, ImageKind::Mobile),
        staged_slot(tablet, ImageKind::Tablet),
    ])
}

/// Manages banner CRUD and the media tasks each mutation enqueues.
#[derive(Debug, Clone)]
pub struct BannerService {
    /// Banner repository.
    repo: Arc<BannerRepository>,
    /// Media task queue.
    queue: Arc<TaskQueue>,
    /// Listing cache.
    cache: CacheManager,
}

impl BannerService {
    /// Creates a new banner service.
    pub fn new(repo: Arc<BannerRepository>, queue: Arc<TaskQueue>, cache: CacheManager) -> Self {
        Self { repo, queue, cache }
    }

    /// Creates a banner with placeholder image paths and enqueues the
    /// uploads. Returns as soon as the row and the task are persisted.
    pub async fn create(&self, req: CreateBannerRequest, files: BannerFiles) -> AppResult<Banner> {
        let images = build_slots(&files)?;

        // At most one active banner per placement.
        if req.is_active {
            self.repo.deactivate_others(req.kind, None).await?;
        }

        let banner = self
            .repo
            .create(&CreateBanner {
                name: req.name,
                link: req.link,
                kind: req.kind,
                is_active: req.is_active,
                images: images.clone(),
            })
            .await?;

        self.queue
            .enqueue(
                &TaskPayload::UploadMany(UploadManyPayload {
                    entity: EntityRef {
                        kind: EntityKind::Banner,
                        id: banner.id,
                    },
                    images,
                    folder: EntityKind::Banner.folder().to_string(),
                    staging_prefix: EntityKind::Banner.staging_prefix().to_string(),
                }),
                RetryOptions::default(),
            )
            .await?;

        invalidate_namespace(&self.cache, EntityKind::Banner).await;

        info!(banner_id = %banner.id, kind = %banner.kind, "Banner created");
        Ok(banner)
    }

    /// Lists banners through the read-through cache.
    pub async fn list(&self, query: BannerListQuery) -> AppResult<PageResponse<Banner>> {
        let key = keys::listing(EntityKind::Banner, &query)?;
        read_through(&self.cache, &key, LISTING_TTL, || async {
            self.repo.paginate(&query).await
        })
        .await
    }

    /// Gets a banner by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Banner> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Banner {id} not found")))
    }

    /// Updates a banner, replacing any image slot a new file was staged
    /// for. Each replaced slot's old remote object is enqueued for
    /// deletion; the new files are enqueued as one upload task.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateBannerRequest,
        files: BannerFiles,
    ) -> AppResult<Banner> {
        let banner = self.get(id).await?;
        let mut images = banner.images().to_vec();

        let replacements = [
            (ImageKind::Desktop, &files.desktop),
            (ImageKind::Tablet, &files.tablet),
            (ImageKind::Mobile, &files.mobile),
        ];
        for (slot_kind, staged) in replacements {
            let Some(file) = staged else { continue };

            if let Some(pos) = images.iter().position(|img| img.kind == slot_kind) {
                let previous = images.remove(pos);
                // Tolerant delete: placeholder paths simply fail to parse
                // on the worker side and resolve as a no-op.
                self.queue
                    .enqueue(
                        &TaskPayload::Delete(DeletePayload {
                            url: previous.path,
                            folder: EntityKind::Banner.folder().to_string(),
                        }),
                        RetryOptions::default(),
                    )
                    .await?;
            }

            images.push(staged_slot(file, slot_kind));
        }

        if req.is_active {
            self.repo.deactivate_others(req.kind, Some(id)).await?;
        }

        let updated = self
            .repo
            .update(
                id,
                &UpdateBanner {
                    name: req.name,
                    link: req.link,
                    kind: req.kind,
                    is_active: req.is_active,
                    images: images.clone(),
                },
            )
            .await?;

        self.queue
            .enqueue(
                &TaskPayload::UploadMany(UploadManyPayload {
                    entity: EntityRef {
                        kind: EntityKind::Banner,
                        id,
                    },
                    images,
                    folder: EntityKind::Banner.folder().to_string(),
                    staging_prefix: EntityKind::Banner.staging_prefix().to_string(),
                }),
                RetryOptions::default(),
            )
            .await?;

        invalidate_namespace(&self.cache, EntityKind::Banner).await;

        info!(banner_id = %id, "Banner updated");
        Ok(updated)
    }

    /// Deletes a banner and enqueues remote deletes for its images.
    ///
    /// The repository returns the deleted snapshot, so the media cleanup
    /// is orchestrated explicitly here rather than hidden in the
    /// persistence layer.
    pub async fn delete(&self, id: Uuid) -> AppResult<Banner> {
        let banner = self
            .repo
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Banner {id} not found")))?;

        for image in banner.images() {
            self.queue
                .enqueue(
                    &TaskPayload::Delete(DeletePayload {
                        url: image.path.clone(),
                        folder: EntityKind::Banner.folder().to_string(),
                    }),
                    RetryOptions::default(),
                )
                .await?;
        }

        invalidate_namespace(&self.cache, EntityKind::Banner).await;

        info!(banner_id = %id, "Banner deleted");
        Ok(banner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(name: &str) -> StagedFile {
        StagedFile {
            path: format!("/banners/{name}"),
            filename: name.to_string(),
        }
    }

    #[test]
    fn all_three_slots_are_required() {
        let err = build_slots(&BannerFiles {
            desktop: Some(staged("d.png")),
            tablet: None,
            mobile: Some(staged("m.png")),
        })
        .unwrap_err();
        assert_eq!(err.kind, showroom_core::error::ErrorKind::Validation);
    }

    #[test]
    fn slots_carry_placeholder_paths_and_staged_sources() {
        let slots = build_slots(&BannerFiles {
            desktop: Some(staged("d.png")),
            tablet: Some(staged("t.png")),
            mobile: Some(staged("m.png")),
        })
        .unwrap();

        assert_eq!(slots.len(), 3);
        let desktop = slots.iter().find(|s| s.kind == ImageKind::Desktop).unwrap();
        assert_eq!(desktop.path, "/banners/d.png");
        assert_eq!(desktop.src.as_deref(), Some("/banners/d.png"));
        assert!(slots.iter().all(|s| s.is_pending()));
    }
}
