//! Banner repository implementation.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use showroom_core::error::{AppError, ErrorKind};
use showroom_core::result::AppResult;
use showroom_core::types::pagination::{PageRequest, PageResponse};
use showroom_core::types::sorting::SortDirection;
use showroom_entity::banner::{Banner, BannerImage, BannerKind, CreateBanner, UpdateBanner};

use super::{escape_like, sort_clause};

/// Columns banner listings may sort on.
const SORTABLE_FIELDS: &[&str] = &["name", "link", "kind", "is_active", "created_at", "updated_at"];

/// Listing query for banners. Serializes deterministically (declaration
/// order), which the cache layer relies on to key listing entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BannerListQuery {
    /// Pagination parameters.
    #[serde(flatten)]
    pub page: PageRequest,
    /// Case-insensitive substring match on name, link, or kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Filter on active state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Filter on site placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BannerKind>,
    /// Column to sort on (validated against an allowlist).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub order: SortDirection,
}

/// Repository for banner CRUD and listing operations.
#[derive(Debug, Clone)]
pub struct BannerRepository {
    pool: PgPool,
}

impl BannerRepository {
    /// Create a new banner repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a banner by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Banner>> {
        sqlx::query_as::<_, Banner>("SELECT * FROM banners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find banner", e))
    }

    /// Create a new banner.
    pub async fn create(&self, data: &CreateBanner) -> AppResult<Banner> {
        sqlx::query_as::<_, Banner>(
            "INSERT INTO banners (name, link, kind, is_active, images) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.link)
        .bind(data.kind)
        .bind(data.is_active)
        .bind(Json(&data.images))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create banner", e))
    }

    /// Update all business fields of a banner (synchronous path).
    pub async fn update(&self, id: Uuid, data: &UpdateBanner) -> AppResult<Banner> {
        sqlx::query_as::<_, Banner>(
            "UPDATE banners SET name = $2, link = $3, kind = $4, is_active = $5, \
             images = $6, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.link)
        .bind(data.kind)
        .bind(data.is_active)
        .bind(Json(&data.images))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update banner", e))?
        .ok_or_else(|| AppError::not_found(format!("Banner {id} not found")))
    }

    /// Replace only the image slot list. This is the pipeline worker's
    /// write-back path; business fields written concurrently by the
    /// synchronous path are left untouched.
    pub async fn set_images(&self, id: Uuid, images: &[BannerImage]) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE banners SET images = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(Json(images))
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to set banner images", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Banner {id} not found")));
        }
        Ok(())
    }

    /// Deactivate every active banner of the given placement, optionally
    /// sparing one (the banner being activated).
    pub async fn deactivate_others(&self, kind: BannerKind, except: Option<Uuid>) -> AppResult<u64> {
        let result = match except {
            Some(id) => sqlx::query(
                "UPDATE banners SET is_active = false, updated_at = NOW() \
                 WHERE kind = $1 AND is_active = true AND id != $2",
            )
            .bind(kind)
            .bind(id)
            .execute(&self.pool)
            .await,
            None => sqlx::query(
                "UPDATE banners SET is_active = false, updated_at = NOW() \
                 WHERE kind = $1 AND is_active = true",
            )
            .bind(kind)
            .execute(&self.pool)
            .await,
        }
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to deactivate banners", e))?;

        Ok(result.rows_affected())
    }

    /// Delete a banner, returning the deleted snapshot so the caller can
    /// enqueue remote deletes for its attached images.
    pub async fn delete(&self, id: Uuid) -> AppResult<Option<Banner>> {
        sqlx::query_as::<_, Banner>("DELETE FROM banners WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete banner", e))
    }

    /// List banners with search, filters, validated sorting, and pagination.
    pub async fn paginate(&self, query: &BannerListQuery) -> AppResult<PageResponse<Banner>> {
        let order_clause = sort_clause(query.sort_by.as_deref(), query.order, SORTABLE_FIELDS)?;

        let search_pattern = query
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let mut conds: Vec<String> = Vec::new();
        let mut n = 0u32;
        if search_pattern.is_some() {
            n += 1;
            conds.push(format!(
                "(name ILIKE ${n} OR link ILIKE ${n} OR kind::text ILIKE ${n})"
            ));
        }
        if query.is_active.is_some() {
            n += 1;
            conds.push(format!("is_active = ${n}"));
        }
        if query.kind.is_some() {
            n += 1;
            conds.push(format!("kind = ${n}"));
        }
        let where_sql = if conds.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conds.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM banners {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(pattern) = &search_pattern {
            count_query = count_query.bind(pattern);
        }
        if let Some(is_active) = query.is_active {
            count_query = count_query.bind(is_active);
        }
        if let Some(kind) = query.kind {
            count_query = count_query.bind(kind);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count banners", e))?;

        let list_sql = format!(
            "SELECT * FROM banners {where_sql}ORDER BY {order_clause} LIMIT ${} OFFSET ${}",
            n + 1,
            n + 2
        );
        let mut list_query = sqlx::query_as::<_, Banner>(&list_sql);
        if let Some(pattern) = &search_pattern {
            list_query = list_query.bind(pattern);
        }
        if let Some(is_active) = query.is_active {
            list_query = list_query.bind(is_active);
        }
        if let Some(kind) = query.kind {
            list_query = list_query.bind(kind);
        }
        let banners = list_query
            .bind(query.page.limit() as i64)
            .bind(query.page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list banners", e))?;

        Ok(PageResponse::new(
            banners,
            query.page.page,
            query.page.per_page,
            total as u64,
        ))
    }
}
