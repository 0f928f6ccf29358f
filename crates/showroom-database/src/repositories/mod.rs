//! Concrete repository implementations.

pub mod banner;
pub mod category;
pub mod task;

use showroom_core::error::AppError;
use showroom_core::result::AppResult;
use showroom_core::types::SortDirection;

/// Build a validated `ORDER BY` clause.
///
/// `sortable` is the allowlist of column names a caller may sort on. An
/// unsupported field is rejected with a descriptive validation error
/// before any SQL executes; the field name is only ever interpolated into
/// SQL after passing this check.
pub(crate) fn sort_clause(
    sort_by: Option<&str>,
    order: SortDirection,
    sortable: &[&str],
) -> AppResult<String> {
    match sort_by {
        None => Ok("created_at DESC".to_string()),
        Some(field) if sortable.contains(&field) => Ok(format!("{field} {}", order.as_sql())),
        Some(other) => Err(AppError::validation(format!(
            "Unsupported sort field '{other}'; supported fields: {}",
            sortable.join(", ")
        ))),
    }
}

/// Escape LIKE metacharacters in user-supplied search input.
pub(crate) fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[&str] = &["name", "created_at"];

    #[test]
    fn default_sort_is_newest_first() {
        assert_eq!(
            sort_clause(None, SortDirection::Asc, SORTABLE).unwrap(),
            "created_at DESC"
        );
    }

    #[test]
    fn allowed_field_is_interpolated_with_direction() {
        assert_eq!(
            sort_clause(Some("name"), SortDirection::Desc, SORTABLE).unwrap(),
            "name DESC"
        );
    }

    #[test]
    fn unsupported_sort_field_is_rejected() {
        let err = sort_clause(Some("icon; DROP TABLE"), SortDirection::Asc, SORTABLE).unwrap_err();
        assert_eq!(err.kind, showroom_core::error::ErrorKind::Validation);
        assert!(err.message.contains("Unsupported sort field"));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
