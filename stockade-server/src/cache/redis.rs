//! Redis-backed cache

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::TtlCache;
use crate::error::ServerError;

/// TTL cache backed by a shared Redis instance
///
/// Expiry is delegated to Redis (`SET ... EX`); reads of an expired key
/// return nothing without any client-side bookkeeping.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect and verify the server responds to PING
    pub async fn connect(url: &str) -> Result<Self, ServerError> {
        let client = Client::open(url)
            .map_err(|e| ServerError::Internal(format!("invalid Redis URL '{}': {}", url, e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| ServerError::Internal(format!("Redis connection failed: {}", e)))?;

        let cache = Self { conn };
        cache.ping().await?;
        Ok(cache)
    }

    async fn ping(&self) -> Result<(), ServerError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ServerError::Internal(format!("Redis ping failed: {}", e)))?;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(ServerError::Internal(format!(
                "Redis ping returned unexpected response: {}",
                reply
            )))
        }
    }
}

#[async_trait]
impl TtlCache for RedisCache {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ServerError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ServerError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), ServerError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a local Redis; skipped silently when unavailable
    #[tokio::test]
    async fn test_redis_roundtrip() {
        let Ok(cache) = RedisCache::connect("redis://localhost:6379").await else {
            return;
        };

        let key = format!("stockade_test:{}", uuid::Uuid::new_v4());
        cache
            .put(&key, "value", Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("value"));

        cache.delete(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }
}
