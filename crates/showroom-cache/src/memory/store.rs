//! In-memory cache implementation using the moka crate.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use showroom_core::config::cache::MemoryCacheConfig;
use showroom_core::result::AppResult;
use showroom_core::traits::cache::CacheProvider;

/// In-memory cache provider using moka.
///
/// moka sets TTL at cache level rather than per entry; the listing cache
/// uses one uniform TTL anyway, so per-entry TTL arguments are accepted
/// and ignored here.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, String>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let ttl = config.time_to_live_seconds.max(default_ttl_seconds);
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(ttl))
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn keys_matching(&self, pattern: &str) -> AppResult<Vec<String>> {
        // Moka has no pattern scanning; glob patterns are reduced to prefix
        // matching, which covers the `<namespace>:*` invalidation shape.
        let prefix = pattern.trim_end_matches('*');
        Ok(self
            .cache
            .iter()
            .filter(|entry| entry.0.starts_with(prefix))
            .map(|entry| entry.0.to_string())
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<u64> {
        let mut count = 0u64;
        for key in keys {
            if self.cache.remove(key).await.is_some() {
                count += 1;
            }
        }
        debug!(count, "Deleted keys");
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        let config = MemoryCacheConfig {
            max_capacity: 1000,
            time_to_live_seconds: 60,
        };
        MemoryCacheProvider::new(&config, 60)
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        let val = provider.get("key2").await.unwrap();
        assert_eq!(val, None);
    }

    #[tokio::test]
    async fn test_keys_matching_by_namespace() {
        let provider = make_provider();
        provider.set_default("categories:{\"page\":1}", "a").await.unwrap();
        provider.set_default("categories:{\"page\":2}", "b").await.unwrap();
        provider.set_default("banners:{\"page\":1}", "c").await.unwrap();

        let mut keys = provider.keys_matching("categories:*").await.unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec!["categories:{\"page\":1}", "categories:{\"page\":2}"]
        );
    }

    #[tokio::test]
    async fn test_delete_pattern_clears_namespace_only() {
        let provider = make_provider();
        provider.set_default("categories:{\"page\":1}", "a").await.unwrap();
        provider.set_default("categories:{\"page\":2}", "b").await.unwrap();
        provider.set_default("banners:{\"page\":1}", "c").await.unwrap();

        let removed = provider.delete_pattern("categories:*").await.unwrap();
        assert_eq!(removed, 2);
        assert!(!provider.exists("categories:{\"page\":1}").await.unwrap());
        assert!(provider.exists("banners:{\"page\":1}").await.unwrap());
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let provider = make_provider();
        let data = serde_json::json!({"name": "test", "count": 42});
        provider
            .set_json("json_key", &data, Duration::from_secs(60))
            .await
            .unwrap();
        let result: Option<serde_json::Value> = provider.get_json("json_key").await.unwrap();
        assert_eq!(result, Some(data));
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = make_provider();
        assert!(provider.health_check().await.unwrap());
    }
}
