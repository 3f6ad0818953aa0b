//! TTL key-value cache backing the code and session managers
//!
//! The primary backend is Redis; when it is unreachable at startup the
//! server falls back to a per-process in-memory map. The fallback is not
//! shared across instances: a multi-instance deployment without Redis
//! will not see each other's codes or sessions.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ServerError;

/// A key-value store whose entries expire after a TTL
///
/// Keys are namespaced strings (e.g. `otp:7` vs `session:7`), so code and
/// session entries for the same owner never collide.
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Store a value under `key`, expiring after `ttl`. Overwrites any
    /// existing entry and resets its expiry.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ServerError>;

    /// Fetch the value under `key`, or None if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, ServerError>;

    /// Delete the entry under `key`; no error if absent
    async fn delete(&self, key: &str) -> Result<(), ServerError>;
}

/// Connect to the configured cache backend, falling back to the in-process
/// map when Redis is unreachable
pub async fn connect(redis_url: Option<&str>) -> Arc<dyn TtlCache> {
    match redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => {
                tracing::info!(url = %url, "Connected to Redis cache");
                Arc::new(cache)
            }
            Err(e) => {
                tracing::warn!(
                    url = %url,
                    error = %e,
                    "Redis unreachable, falling back to in-process cache"
                );
                Arc::new(MemoryCache::new())
            }
        },
        None => {
            tracing::info!("No Redis URL configured, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    }
}
