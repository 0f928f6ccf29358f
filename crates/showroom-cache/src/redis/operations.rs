//! Redis cache provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use showroom_core::error::{AppError, ErrorKind};
use showroom_core::result::AppResult;
use showroom_core::traits::cache::CacheProvider;

use super::client::RedisClient;

/// Redis-backed cache provider.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    /// Redis client.
    client: RedisClient,
    /// Default TTL.
    default_ttl: Duration,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient, default_ttl_seconds: u64) -> Self {
        Self {
            client,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .set_ex(&full_key, value, ttl.as_secs())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: bool = conn.exists(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn keys_matching(&self, pattern: &str) -> AppResult<Vec<String>> {
        let full_pattern = self.client.prefixed_key(pattern);
        let mut conn = self.client.conn_mut();

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&full_pattern)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        // Strip the prefix so returned keys can be fed back to delete_many.
        let prefix = self.client.prefix();
        Ok(keys
            .into_iter()
            .map(|k| k.strip_prefix(prefix).map(str::to_string).unwrap_or(k))
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.client.conn_mut();
        let mut count = 0u64;
        for key in keys {
            let full_key = self.client.prefixed_key(key);
            let removed: u64 = conn.del(&full_key).await.map_err(Self::map_err)?;
            count += removed;
        }
        Ok(count)
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let keys = self.keys_matching(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let count = self.delete_many(&keys).await?;
        debug!(pattern, count, "Deleted keys matching pattern");
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
