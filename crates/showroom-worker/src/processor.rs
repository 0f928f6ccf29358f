//! The media task processor: uploads staged files to the remote store and
//! writes the final URLs back onto the owning entity.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use showroom_cache::CacheManager;
use showroom_cache::keys;
use showroom_core::error::AppError;
use showroom_core::result::AppResult;
use showroom_core::traits::cache::CacheProvider;
use showroom_core::traits::media::MediaStore;
use showroom_database::repositories::banner::BannerRepository;
use showroom_database::repositories::category::CategoryRepository;
use showroom_entity::banner::BannerImage;
use showroom_entity::task::{
    DeletePayload, EntityKind, MediaTask, TaskPayload, UploadManyPayload, UploadSinglePayload,
};
use showroom_media::StagingArea;

/// Error from task execution.
#[derive(Debug, thiserror::Error)]
pub enum TaskExecutionError {
    /// Permanent failure — do not retry.
    #[error("Permanent task failure: {0}")]
    Permanent(String),

    /// Transient failure — may retry.
    #[error("Transient task failure: {0}")]
    Transient(String),
}

impl TaskExecutionError {
    fn transient(err: AppError) -> Self {
        Self::Transient(err.to_string())
    }
}

/// Trait for the single handler bound to a queue instance.
#[async_trait]
pub trait TaskHandler: Send + Sync + std::fmt::Debug {
    /// Execute one claimed task.
    async fn handle(&self, task: &MediaTask) -> Result<(), TaskExecutionError>;
}

/// Write-back seam the processor uses to patch entities.
///
/// The processor only ever touches the media fields it owns (icon, image
/// slots); business fields written concurrently by the synchronous path
/// are never clobbered.
#[async_trait]
pub trait EntityWriteBack: Send + Sync + std::fmt::Debug {
    /// Patch a category's icon URL.
    async fn set_category_icon(&self, id: Uuid, icon_url: &str) -> AppResult<()>;

    /// Replace a banner's image slot list.
    async fn set_banner_images(&self, id: Uuid, images: &[BannerImage]) -> AppResult<()>;
}

/// [`EntityWriteBack`] over the concrete repositories.
#[derive(Debug, Clone)]
pub struct RepositoryWriteBack {
    banners: Arc<BannerRepository>,
    categories: Arc<CategoryRepository>,
}

impl RepositoryWriteBack {
    /// Create a write-back over the two entity repositories.
    pub fn new(banners: Arc<BannerRepository>, categories: Arc<CategoryRepository>) -> Self {
        Self { banners, categories }
    }
}

#[async_trait]
impl EntityWriteBack for RepositoryWriteBack {
    async fn set_category_icon(&self, id: Uuid, icon_url: &str) -> AppResult<()> {
        self.categories.set_icon(id, icon_url).await
    }

    async fn set_banner_images(&self, id: Uuid, images: &[BannerImage]) -> AppResult<()> {
        self.banners.set_images(id, images).await
    }
}

/// The pipeline's task processor.
///
/// Dispatches on the typed payload union with an exhaustive match. Uploads
/// are not idempotent: a retry after partial completion (upload succeeded,
/// cleanup or write-back failed) re-uploads the file and orphans the
/// earlier remote object. This is an accepted cost of the simple retry
/// policy.
#[derive(Debug, Clone)]
pub struct MediaTaskProcessor {
    store: Arc<dyn MediaStore>,
    write_back: Arc<dyn EntityWriteBack>,
    staging: StagingArea,
    cache: CacheManager,
}

impl MediaTaskProcessor {
    /// Create a new processor.
    pub fn new(
        store: Arc<dyn MediaStore>,
        write_back: Arc<dyn EntityWriteBack>,
        staging: StagingArea,
        cache: CacheManager,
    ) -> Self {
        Self {
            store,
            write_back,
            staging,
            cache,
        }
    }

    /// Drop every listing cache entry for the entity type. Cache failures
    /// never fail the task; the entries expire on their TTL anyway.
    async fn invalidate_namespace(&self, kind: EntityKind) {
        let pattern = keys::namespace_pattern(kind);
        match self.cache.delete_pattern(&pattern).await {
            Ok(count) => {
                tracing::debug!(pattern, count, "Invalidated listing cache");
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Listing cache invalidation failed");
            }
        }
    }

    async fn upload_single(&self, body: &UploadSinglePayload) -> Result<(), TaskExecutionError> {
        let entity = body.entity;
        if entity.kind != EntityKind::Category {
            return Err(TaskExecutionError::Permanent(format!(
                "upload_single targets icon-bearing entities, not {}",
                entity.kind
            )));
        }

        let buffer = self
            .staging
            .read(&body.file.path)
            .await
            .map_err(TaskExecutionError::transient)?;

        let uploaded = self
            .store
            .upload(buffer, &body.folder)
            .await
            .map_err(TaskExecutionError::transient)?;

        self.staging
            .remove(&body.staging_prefix, &body.file.filename)
            .await
            .map_err(TaskExecutionError::transient)?;

        self.write_back
            .set_category_icon(entity.id, &uploaded.secure_url)
            .await
            .map_err(TaskExecutionError::transient)?;

        self.invalidate_namespace(entity.kind).await;

        tracing::info!(
            entity_id = %entity.id,
            url = %uploaded.secure_url,
            "Icon uploaded and written back"
        );
        Ok(())
    }

    async fn upload_many(&self, body: &UploadManyPayload) -> Result<(), TaskExecutionError> {
        let entity = body.entity;
        if entity.kind != EntityKind::Banner {
            return Err(TaskExecutionError::Permanent(format!(
                "upload_many targets slot-bearing entities, not {}",
                entity.kind
            )));
        }

        // Slots are pushed one by one so an already-uploaded slot survives
        // a later slot's failure on the next attempt. The trait-level batch
        // upload is all-or-nothing and deliberately not used here.
        let mut updated = Vec::with_capacity(body.images.len());
        for image in &body.images {
            let Some(src) = image.src.clone() else {
                updated.push(image.clone());
                continue;
            };

            let buffer = self
                .staging
                .read(&src)
                .await
                .map_err(TaskExecutionError::transient)?;

            let uploaded = self
                .store
                .upload(buffer, &body.folder)
                .await
                .map_err(TaskExecutionError::transient)?;

            self.staging
                .remove_path(&src)
                .await
                .map_err(TaskExecutionError::transient)?;

            updated.push(BannerImage {
                path: uploaded.secure_url,
                kind: image.kind,
                src: None,
            });
        }

        self.write_back
            .set_banner_images(entity.id, &updated)
            .await
            .map_err(TaskExecutionError::transient)?;

        self.invalidate_namespace(entity.kind).await;

        tracing::info!(
            entity_id = %entity.id,
            slots = updated.len(),
            "Image slots uploaded and written back"
        );
        Ok(())
    }

    async fn delete(&self, body: &DeletePayload) -> Result<(), TaskExecutionError> {
        let deleted = self
            .store
            .delete_by_url(&body.url)
            .await
            .map_err(TaskExecutionError::transient)?;

        if deleted {
            tracing::info!(url = %body.url, folder = %body.folder, "Remote object deleted");
        } else {
            tracing::debug!(url = %body.url, "Nothing to delete for URL");
        }
        // The entity was already cleared or replaced by the synchronous
        // caller before this task was enqueued; no write-back here.
        Ok(())
    }
}

#[async_trait]
impl TaskHandler for MediaTaskProcessor {
    async fn handle(&self, task: &MediaTask) -> Result<(), TaskExecutionError> {
        let payload = TaskPayload::from_parts(task.kind, &task.payload)
            .map_err(|e| TaskExecutionError::Permanent(e.to_string()))?;

        match &payload {
            TaskPayload::UploadSingle(body) => self.upload_single(body).await,
            TaskPayload::UploadMany(body) => self.upload_many(body).await,
            TaskPayload::Delete(body) => self.delete(body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use chrono::Utc;

    use showroom_cache::memory::MemoryCacheProvider;
    use showroom_core::config::cache::MemoryCacheConfig;
    use showroom_entity::banner::ImageKind;
    use showroom_entity::task::{EntityRef, StagedFile, TaskStatus};
    use showroom_media::InMemoryMediaStore;

    #[derive(Debug, Default)]
    struct MockWriteBack {
        icons: Mutex<Vec<(Uuid, String)>>,
        images: Mutex<Vec<(Uuid, Vec<BannerImage>)>>,
    }

    #[async_trait]
    impl EntityWriteBack for MockWriteBack {
        async fn set_category_icon(&self, id: Uuid, icon_url: &str) -> AppResult<()> {
            self.icons.lock().unwrap().push((id, icon_url.to_string()));
            Ok(())
        }

        async fn set_banner_images(&self, id: Uuid, images: &[BannerImage]) -> AppResult<()> {
            self.images.lock().unwrap().push((id, images.to_vec()));
            Ok(())
        }
    }

    struct Harness {
        processor: MediaTaskProcessor,
        store: InMemoryMediaStore,
        write_back: Arc<MockWriteBack>,
        staging: StagingArea,
        cache: CacheManager,
        _dir: tempfile::TempDir,
    }

    fn make_harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let store = InMemoryMediaStore::new();
        let write_back = Arc::new(MockWriteBack::default());
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig {
                max_capacity: 1000,
                time_to_live_seconds: 600,
            },
            600,
        )));
        let processor = MediaTaskProcessor::new(
            Arc::new(store.clone()),
            write_back.clone(),
            staging.clone(),
            cache.clone(),
        );
        Harness {
            processor,
            store,
            write_back,
            staging,
            cache,
            _dir: dir,
        }
    }

    fn make_task(payload: &TaskPayload) -> MediaTask {
        let now = Utc::now();
        MediaTask {
            id: Uuid::new_v4(),
            kind: payload.kind(),
            queue: "media".into(),
            payload: payload.to_value().unwrap(),
            error_message: None,
            status: TaskStatus::Running,
            attempts: 1,
            max_attempts: 3,
            backoff_ms: 5000,
            scheduled_at: None,
            started_at: Some(now),
            completed_at: None,
            worker_id: Some("test-worker".into()),
            created_at: now,
            updated_at: now,
        }
    }

    async fn stage(staging: &StagingArea, rel: &str, contents: &[u8]) {
        let full = staging.root().join(rel.trim_start_matches('/'));
        tokio::fs::create_dir_all(full.parent().unwrap()).await.unwrap();
        tokio::fs::write(&full, contents).await.unwrap();
    }

    #[tokio::test]
    async fn upload_single_patches_icon_and_cleans_staging() {
        let h = make_harness();
        let category_id = Uuid::new_v4();
        stage(&h.staging, "/categories/a.png", b"icon bytes").await;
        h.cache
            .set_default("categories:{\"page\":1,\"per_page\":10}", "cached listing")
            .await
            .unwrap();

        let payload = TaskPayload::UploadSingle(UploadSinglePayload {
            entity: EntityRef {
                kind: EntityKind::Category,
                id: category_id,
            },
            file: StagedFile {
                path: "/categories/a.png".into(),
                filename: "a.png".into(),
            },
            folder: "categories".into(),
            staging_prefix: "/categories/".into(),
        });

        h.processor.handle(&make_task(&payload)).await.unwrap();

        // Written back exactly once, with the URL the store returned.
        let icons = h.write_back.icons.lock().unwrap().clone();
        assert_eq!(icons.len(), 1);
        assert_eq!(icons[0].0, category_id);
        assert_eq!(
            icons[0].1,
            "https://cdn.test/demo/image/upload/v1/categories/obj1.png"
        );

        // Staged temp file is gone and the listing namespace is empty.
        assert!(!h.staging.exists("/categories/a.png").await);
        assert!(
            h.cache
                .keys_matching("categories:*")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn upload_many_uploads_pending_slots_and_passes_others_through() {
        let h = make_harness();
        let banner_id = Uuid::new_v4();
        stage(&h.staging, "/banners/hero.png", b"desktop bytes").await;

        let already_uploaded = BannerImage {
            path: "https://cdn.test/demo/image/upload/v1/banners/old.png".into(),
            kind: ImageKind::Mobile,
            src: None,
        };
        let payload = TaskPayload::UploadMany(UploadManyPayload {
            entity: EntityRef {
                kind: EntityKind::Banner,
                id: banner_id,
            },
            images: vec![
                BannerImage::staged(
                    "/banners/hero.png".into(),
                    ImageKind::Desktop,
                    "/banners/hero.png".into(),
                ),
                already_uploaded.clone(),
            ],
            folder: "banners".into(),
            staging_prefix: "/banners/".into(),
        });

        h.processor.handle(&make_task(&payload)).await.unwrap();

        let writes = h.write_back.images.lock().unwrap().clone();
        assert_eq!(writes.len(), 1);
        let (id, slots) = &writes[0];
        assert_eq!(*id, banner_id);
        assert_eq!(slots.len(), 2);
        assert_eq!(
            slots[0].path,
            "https://cdn.test/demo/image/upload/v1/banners/obj1.png"
        );
        assert_eq!(slots[0].src, None);
        assert_eq!(slots[1], already_uploaded);

        assert!(!h.staging.exists("/banners/hero.png").await);
        assert_eq!(h.store.uploads().len(), 1);
    }

    #[tokio::test]
    async fn delete_with_unparsable_url_is_a_noop_success() {
        let h = make_harness();
        let payload = TaskPayload::Delete(DeletePayload {
            url: "https://elsewhere.test/no-marker/a.png".into(),
            folder: "categories".into(),
        });

        h.processor.handle(&make_task(&payload)).await.unwrap();
        assert!(h.store.deletes().is_empty());
    }

    #[tokio::test]
    async fn delete_resolves_the_object_path() {
        let h = make_harness();
        let payload = TaskPayload::Delete(DeletePayload {
            url: "https://cdn.test/demo/image/upload/v1/banners/obj9.png".into(),
            folder: "banners".into(),
        });

        h.processor.handle(&make_task(&payload)).await.unwrap();
        assert_eq!(h.store.deletes(), vec!["banners/obj9".to_string()]);
    }

    #[tokio::test]
    async fn upload_single_against_a_banner_fails_permanently() {
        let h = make_harness();
        let payload = TaskPayload::UploadSingle(UploadSinglePayload {
            entity: EntityRef {
                kind: EntityKind::Banner,
                id: Uuid::new_v4(),
            },
            file: StagedFile {
                path: "/banners/a.png".into(),
                filename: "a.png".into(),
            },
            folder: "banners".into(),
            staging_prefix: "/banners/".into(),
        });

        let err = h.processor.handle(&make_task(&payload)).await.unwrap_err();
        assert!(matches!(err, TaskExecutionError::Permanent(_)));
        assert!(h.store.uploads().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_fails_permanently() {
        let h = make_harness();
        let mut task = make_task(&TaskPayload::Delete(DeletePayload {
            url: "x".into(),
            folder: "banners".into(),
        }));
        task.kind = showroom_entity::task::TaskKind::UploadSingle;

        let err = h.processor.handle(&task).await.unwrap_err();
        assert!(matches!(err, TaskExecutionError::Permanent(_)));
    }

    #[tokio::test]
    async fn store_outage_is_a_transient_failure() {
        let h = make_harness();
        let category_id = Uuid::new_v4();
        stage(&h.staging, "/categories/b.png", b"icon bytes").await;
        h.store.set_fail_uploads(true);

        let payload = TaskPayload::UploadSingle(UploadSinglePayload {
            entity: EntityRef {
                kind: EntityKind::Category,
                id: category_id,
            },
            file: StagedFile {
                path: "/categories/b.png".into(),
                filename: "b.png".into(),
            },
            folder: "categories".into(),
            staging_prefix: "/categories/".into(),
        });

        let err = h.processor.handle(&make_task(&payload)).await.unwrap_err();
        assert!(matches!(err, TaskExecutionError::Transient(_)));

        // Nothing was written back and the staged file survives for the retry.
        assert!(h.write_back.icons.lock().unwrap().is_empty());
        assert!(h.staging.exists("/categories/b.png").await);
    }
}
