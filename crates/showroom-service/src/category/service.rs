//! Category CRUD with asynchronous icon handling.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use showroom_cache::{CacheManager, keys};
use showroom_core::error::AppError;
use showroom_core::result::AppResult;
use showroom_database::repositories::category::{CategoryListQuery, CategoryRepository};
use showroom_entity::category::{Category, CategoryKind, CreateCategory, UpdateCategory};
use showroom_entity::task::{
    DeletePayload, EntityKind, EntityRef, StagedFile, TaskPayload, UploadSinglePayload,
};
use showroom_worker::{RetryOptions, TaskQueue};

use super::projection;
use crate::cached::{LISTING_TTL, invalidate_namespace, read_through};

/// Request to create a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    /// Display name.
    pub name: String,
    /// What this category groups.
    pub kind: CategoryKind,
    /// Whether the category starts active.
    pub is_active: bool,
}

/// Request to update a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    /// Display name.
    pub name: String,
    /// What this category groups.
    pub kind: CategoryKind,
    /// Whether the category is visible.
    pub is_active: bool,
}

/// Cached listing payload: serialized (optionally projected) items plus
/// pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryListing {
    /// The items on this page, projected to the requested fields.
    pub items: Vec<serde_json::Value>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

/// Manages category CRUD and the media tasks each mutation enqueues.
#[derive(Debug, Clone)]
pub struct CategoryService {
    /// Category repository.
    repo: Arc<CategoryRepository>,
    /// Media task queue.
    queue: Arc<TaskQueue>,
    /// Listing cache.
    cache: CacheManager,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(repo: Arc<CategoryRepository>, queue: Arc<TaskQueue>, cache: CacheManager) -> Self {
        Self { repo, queue, cache }
    }

    fn placeholder_icon(file: &StagedFile) -> String {
        format!("{}{}", EntityKind::Category.staging_prefix(), file.filename)
    }

    async fn enqueue_icon_upload(&self, category_id: Uuid, file: StagedFile) -> AppResult<()> {
        self.queue
            .enqueue(
                &TaskPayload::UploadSingle(UploadSinglePayload {
                    entity: EntityRef {
                        kind: EntityKind::Category,
                        id: category_id,
                    },
                    file,
                    folder: EntityKind::Category.folder().to_string(),
                    staging_prefix: EntityKind::Category.staging_prefix().to_string(),
                }),
                RetryOptions::default(),
            )
            .await?;
        Ok(())
    }

    /// Creates a category; a staged icon file is enqueued for upload and
    /// the row keeps a placeholder path until the worker patches it.
    pub async fn create(
        &self,
        req: CreateCategoryRequest,
        file: Option<StagedFile>,
    ) -> AppResult<Category> {
        let icon = file.as_ref().map(Self::placeholder_icon).unwrap_or_default();

        let category = self
            .repo
            .create(&CreateCategory {
                name: req.name,
                icon,
                kind: req.kind,
                is_active: req.is_active,
            })
            .await?;

        if let Some(file) = file {
            self.enqueue_icon_upload(category.id, file).await?;
        }

        invalidate_namespace(&self.cache, EntityKind::Category).await;

        info!(category_id = %category.id, kind = %category.kind, "Category created");
        Ok(category)
    }

    /// Lists categories through the read-through cache, with optional
    /// field projection.
    ///
    /// The projection list is part of the cache key, so differently
    /// projected listings never collide.
    pub async fn list(&self, query: CategoryListQuery) -> AppResult<CategoryListing> {
        projection::validate_fields(&query.fields)?;

        let key = keys::listing(EntityKind::Category, &query)?;
        read_through(&self.cache, &key, LISTING_TTL, || async {
            let page = self.repo.paginate(&query).await?;

            let items: Vec<serde_json::Value> = page
                .items
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?;

            Ok(CategoryListing {
                items: projection::project(items, &query.fields),
                page: page.page,
                per_page: page.per_page,
                total_items: page.total_items,
                total_pages: page.total_pages,
            })
        })
        .await
    }

    /// Gets a category by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    /// Updates a category. A newly staged icon replaces the previous one:
    /// the old remote object is enqueued for deletion and the new file for
    /// upload.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateCategoryRequest,
        file: Option<StagedFile>,
    ) -> AppResult<Category> {
        let mut category = self
            .repo
            .update(
                id,
                &UpdateCategory {
                    name: req.name,
                    kind: req.kind,
                    is_active: req.is_active,
                },
            )
            .await?;

        if let Some(file) = file {
            if !category.icon.is_empty() {
                self.queue
                    .enqueue(
                        &TaskPayload::Delete(DeletePayload {
                            url: category.icon.clone(),
                            folder: EntityKind::Category.folder().to_string(),
                        }),
                        RetryOptions::default(),
                    )
                    .await?;
            }

            let placeholder = Self::placeholder_icon(&file);
            self.repo.set_icon(id, &placeholder).await?;
            category.icon = placeholder;

            self.enqueue_icon_upload(id, file).await?;
        }

        invalidate_namespace(&self.cache, EntityKind::Category).await;

        info!(category_id = %id, "Category updated");
        Ok(category)
    }

    /// Flips the active flag.
    pub async fn change_status(&self, id: Uuid) -> AppResult<Category> {
        let category = self
            .repo
            .toggle_active(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

        invalidate_namespace(&self.cache, EntityKind::Category).await;

        info!(
            category_id = %id,
            is_active = category.is_active,
            "Category status changed"
        );
        Ok(category)
    }

    /// Deletes a category and enqueues a remote delete for its icon.
    ///
    /// The repository returns the deleted snapshot, so the media cleanup
    /// is orchestrated explicitly here rather than hidden in the
    /// persistence layer.
    pub async fn delete(&self, id: Uuid) -> AppResult<Category> {
        let category = self
            .repo
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

        if !category.icon.is_empty() {
            self.queue
                .enqueue(
                    &TaskPayload::Delete(DeletePayload {
                        url: category.icon.clone(),
                        folder: EntityKind::Category.folder().to_string(),
                    }),
                    RetryOptions::default(),
                )
                .await?;
        }

        invalidate_namespace(&self.cache, EntityKind::Category).await;

        info!(category_id = %id, "Category deleted");
        Ok(category)
    }
}
