//! Session manager
//!
//! One live session per identity: a new login overwrites the previous
//! session, so an older token stops validating the moment a newer one is
//! registered. This is the intended single-active-session policy.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::TtlCache;
use crate::error::ServerError;

#[derive(Clone)]
pub struct SessionManager {
    cache: Arc<dyn TtlCache>,
    lock: Arc<Mutex<()>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(cache: Arc<dyn TtlCache>, ttl: Duration) -> Self {
        Self {
            cache,
            lock: Arc::new(Mutex::new(())),
            ttl,
        }
    }

    fn key(owner_id: i64) -> String {
        format!("session:{}", owner_id)
    }

    /// Register a token as the owner's (only) live session
    pub async fn create(&self, owner_id: i64, token: &str) -> Result<(), ServerError> {
        let _guard = self.lock.lock().await;
        self.cache.put(&Self::key(owner_id), token, self.ttl).await
    }

    /// Drop the owner's session; idempotent
    pub async fn invalidate(&self, owner_id: i64) -> Result<(), ServerError> {
        let _guard = self.lock.lock().await;
        self.cache.delete(&Self::key(owner_id)).await
    }

    /// True only if a live session exists for the owner and its stored
    /// token equals the supplied one
    pub async fn is_valid(&self, owner_id: i64, token: &str) -> Result<bool, ServerError> {
        let _guard = self.lock.lock().await;
        match self.cache.get(&Self::key(owner_id)).await? {
            Some(stored) => Ok(stored == token),
            None => Ok(false),
        }
    }
}
