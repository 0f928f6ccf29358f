//! Field projection for category listings.
//!
//! Typed rows cannot drop columns per query, so projection is applied to
//! the serialized listing payload before it is cached; the cached entry
//! matches exactly what callers receive.

use showroom_core::error::AppError;
use showroom_core::result::AppResult;

/// Fields a category listing may project.
const PROJECTABLE_FIELDS: &[&str] = &[
    "id",
    "name",
    "icon",
    "kind",
    "is_active",
    "created_at",
    "updated_at",
];

/// Validate a projection list against the allowlist.
pub fn validate_fields(fields: &[String]) -> AppResult<()> {
    for field in fields {
        if !PROJECTABLE_FIELDS.contains(&field.as_str()) {
            return Err(AppError::validation(format!(
                "Unsupported projected field '{field}'; supported fields: {}",
                PROJECTABLE_FIELDS.join(", ")
            )));
        }
    }
    Ok(())
}

/// Retain only the requested fields on each serialized item. An empty
/// list means no projection.
pub fn project(items: Vec<serde_json::Value>, fields: &[String]) -> Vec<serde_json::Value> {
    if fields.is_empty() {
        return items;
    }

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .filter(|(key, _)| fields.iter().any(|f| f == key))
                    .collect(),
            ),
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_rejected() {
        let err = validate_fields(&["name".into(), "secret".into()]).unwrap_err();
        assert_eq!(err.kind, showroom_core::error::ErrorKind::Validation);
        assert!(err.message.contains("secret"));
    }

    #[test]
    fn empty_projection_keeps_everything() {
        let items = vec![json!({"id": 1, "name": "a"})];
        assert_eq!(project(items.clone(), &[]), items);
    }

    #[test]
    fn projection_retains_only_requested_fields() {
        let items = vec![json!({"id": 1, "name": "a", "icon": "x.png"})];
        let projected = project(items, &["name".to_string(), "icon".to_string()]);
        assert_eq!(projected, vec![json!({"name": "a", "icon": "x.png"})]);
    }
}
