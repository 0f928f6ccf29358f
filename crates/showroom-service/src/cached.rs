//! Read-through caching helpers for listing queries.
//!
//! The cache is a best-effort accelerator: every cache failure here is
//! logged and swallowed so the repository query still executes and the
//! caller never sees a cache-layer error.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use showroom_cache::CacheManager;
use showroom_core::result::AppResult;
use showroom_core::traits::cache::CacheProvider;
use showroom_entity::task::EntityKind;

/// TTL for cached listing entries.
pub const LISTING_TTL: Duration = Duration::from_secs(600);

/// Consult the cache before running `fetch`; store fresh results.
pub async fn read_through<T, F, Fut>(
    cache: &CacheManager,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> AppResult<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match cache.get_json::<T>(key).await {
        Ok(Some(hit)) => {
            debug!(key, "Listing served from cache");
            return Ok(hit);
        }
        Ok(None) => {}
        Err(e) => {
            warn!(key, error = %e, "Cache read failed, falling back to repository");
        }
    }

    let fresh = fetch().await?;

    if let Err(e) = cache.set_json(key, &fresh, ttl).await {
        warn!(key, error = %e, "Cache write failed, serving uncached result");
    }

    Ok(fresh)
}

/// Drop every listing entry for the entity type. Invalidation failures are
/// swallowed: entries expire on their TTL anyway.
pub async fn invalidate_namespace(cache: &CacheManager, kind: EntityKind) {
    let pattern = showroom_cache::keys::namespace_pattern(kind);
    match cache.delete_pattern(&pattern).await {
        Ok(count) => {
            debug!(pattern, count, "Invalidated listing cache");
        }
        Err(e) => {
            warn!(pattern, error = %e, "Listing cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use showroom_cache::memory::MemoryCacheProvider;
    use showroom_core::config::cache::MemoryCacheConfig;
    use showroom_core::error::AppError;

    fn memory_cache() -> CacheManager {
        CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig {
                max_capacity: 1000,
                time_to_live_seconds: 600,
            },
            600,
        )))
    }

    #[tokio::test]
    async fn second_identical_query_is_served_from_cache() {
        let cache = memory_cache();
        let fetches = AtomicUsize::new(0);

        let fetch = || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(vec!["row1".to_string(), "row2".to_string()])
        };

        let first = read_through(&cache, "categories:{\"page\":1}", LISTING_TTL, fetch)
            .await
            .unwrap();
        let second = read_through(&cache, "categories:{\"page\":1}", LISTING_TTL, || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(vec!["should not run".to_string()])
        })
        .await
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_fetch_independently() {
        let cache = memory_cache();
        let fetches = AtomicUsize::new(0);

        for key in ["categories:{\"page\":1}", "categories:{\"page\":2}"] {
            let _ = read_through(&cache, key, LISTING_TTL, || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok::<_, AppError>(key.to_string())
            })
            .await
            .unwrap();
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    /// Cache backend that fails every operation.
    #[derive(Debug)]
    struct BrokenCache;

    #[async_trait]
    impl CacheProvider for BrokenCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("backend down"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            Err(AppError::cache("backend down"))
        }
        async fn set_default(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::cache("backend down"))
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("backend down"))
        }
        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Err(AppError::cache("backend down"))
        }
        async fn keys_matching(&self, _pattern: &str) -> AppResult<Vec<String>> {
            Err(AppError::cache("backend down"))
        }
        async fn delete_many(&self, _keys: &[String]) -> AppResult<u64> {
            Err(AppError::cache("backend down"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn a_broken_cache_never_breaks_the_primary_path() {
        let cache = CacheManager::from_provider(Arc::new(BrokenCache));

        let result = read_through(&cache, "categories:{}", LISTING_TTL, || async {
            Ok::<_, AppError>("fresh".to_string())
        })
        .await
        .unwrap();
        assert_eq!(result, "fresh");

        // Invalidation against a broken backend is swallowed too.
        invalidate_namespace(&cache, EntityKind::Category).await;
    }
}
