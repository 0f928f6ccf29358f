//! Category repository implementation.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use showroom_core::error::{AppError, ErrorKind};
use showroom_core::result::AppResult;
use showroom_core::types::pagination::{PageRequest, PageResponse};
use showroom_core::types::sorting::SortDirection;
use showroom_entity::category::{Category, CategoryKind, CreateCategory, UpdateCategory};

use super::{escape_like, sort_clause};

/// Columns category listings may sort on.
const SORTABLE_FIELDS: &[&str] = &["name", "kind", "is_active", "created_at", "updated_at"];

/// Listing query for categories. Serializes deterministically (declaration
/// order), which the cache layer relies on to key listing entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryListQuery {
    /// Pagination parameters.
    #[serde(flatten)]
    pub page: PageRequest,
    /// Case-insensitive substring match on name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Filter on active state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Filter on category kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CategoryKind>,
    /// Column to sort on (validated against an allowlist).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub order: SortDirection,
    /// Fields to project into the listing payload (empty = all).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Repository for category CRUD and listing operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category", e))
    }

    /// Create a new category.
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, icon, kind, is_active) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.icon)
        .bind(data.kind)
        .bind(data.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create category", e))
    }

    /// Update all business fields of a category (synchronous path).
    pub async fn update(&self, id: Uuid, data: &UpdateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, kind = $3, is_active = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.kind)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update category", e))?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    /// Replace only the icon URL. This is the pipeline worker's write-back
    /// path (and the synchronous path's placeholder write); business fields
    /// written concurrently are left untouched.
    pub async fn set_icon(&self, id: Uuid, icon: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE categories SET icon = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(icon)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set category icon", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Category {id} not found")));
        }
        Ok(())
    }

    /// Flip the active flag, returning the updated row.
    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET is_active = NOT is_active, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to toggle category status", e)
        })
    }

    /// Delete a category, returning the deleted snapshot so the caller can
    /// enqueue a remote delete for its icon.
    pub async fn delete(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("DELETE FROM categories WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete category", e))
    }

    /// List categories with search, filters, validated sorting, and pagination.
    ///
    /// Field projection is applied by the service layer on the serialized
    /// listing; this method always returns full rows.
    pub async fn paginate(&self, query: &CategoryListQuery) -> AppResult<PageResponse<Category>> {
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
            conds.push(format!("name ILIKE ${n}"));
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

        let count_sql = format!("SELECT COUNT(*) FROM categories {where_sql}");
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
        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count categories", e)
        })?;

        let list_sql = format!(
            "SELECT * FROM categories {where_sql}ORDER BY {order_clause} LIMIT ${} OFFSET ${}",
            n + 1,
            n + 2
        );
        let mut list_query = sqlx::query_as::<_, Category>(&list_sql);
        if let Some(pattern) = &search_pattern {
            list_query = list_query.bind(pattern);
        }
        if let Some(is_active) = query.is_active {
            list_query = list_query.bind(is_active);
        }
        if let Some(kind) = query.kind {
            list_query = list_query.bind(kind);
        }
        let categories = list_query
            .bind(query.page.limit() as i64)
            .bind(query.page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list categories", e)
            })?;

        Ok(PageResponse::new(
            categories,
            query.page.page,
            query.page.per_page,
            total as u64,
        ))
    }
}
