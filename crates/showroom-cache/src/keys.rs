//! Cache key builders for all Showroom cache entries.
//!
//! Centralising key construction prevents typos and makes it easy to find
//! every key the application uses. Listing keys embed the canonical JSON
//! serialization of the query, so two structurally identical queries
//! always hit the same entry and any differing field produces a miss.

use serde::Serialize;

use showroom_core::result::AppResult;
use showroom_entity::task::EntityKind;

/// Cache key for a listing query of the given entity type.
pub fn listing(kind: EntityKind, query: &impl Serialize) -> AppResult<String> {
    let serialized = serde_json::to_string(query)?;
    Ok(format!("{}:{serialized}", kind.cache_namespace()))
}

/// Pattern matching every listing entry of the given entity type.
pub fn namespace_pattern(kind: EntityKind) -> String {
    format!("{}:*", kind.cache_namespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Clone)]
    struct Query {
        page: u64,
        per_page: u64,
        search: Option<String>,
    }

    #[test]
    fn identical_queries_share_a_key() {
        let a = Query {
            page: 1,
            per_page: 10,
            search: None,
        };
        let b = a.clone();
        assert_eq!(
            listing(EntityKind::Category, &a).unwrap(),
            listing(EntityKind::Category, &b).unwrap()
        );
    }

    #[test]
    fn any_field_change_produces_a_different_key() {
        let a = Query {
            page: 1,
            per_page: 10,
            search: None,
        };
        let b = Query { page: 2, ..a.clone() };
        assert_ne!(
            listing(EntityKind::Category, &a).unwrap(),
            listing(EntityKind::Category, &b).unwrap()
        );
    }

    #[test]
    fn keys_are_namespaced_by_entity_type() {
        let q = Query {
            page: 1,
            per_page: 10,
            search: None,
        };
        let banner_key = listing(EntityKind::Banner, &q).unwrap();
        let category_key = listing(EntityKind::Category, &q).unwrap();
        assert!(banner_key.starts_with("banners:"));
        assert!(category_key.starts_with("categories:"));
    }

    #[test]
    fn pattern_covers_the_whole_namespace() {
        assert_eq!(namespace_pattern(EntityKind::Banner), "banners:*");
        assert_eq!(namespace_pattern(EntityKind::Category), "categories:*");
    }
}
