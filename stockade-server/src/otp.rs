//! One-time login code manager
//!
//! At most one live code per owner: issuing overwrites any unconsumed
//! predecessor, and a successful verification consumes the code. A
//! mismatched candidate leaves the stored code in place so the owner can
//! retry until it expires or is reissued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::TtlCache;
use crate::crypto;
use crate::error::ServerError;

#[derive(Clone)]
pub struct OtpManager {
    cache: Arc<dyn TtlCache>,
    // Serializes issue/verify so concurrent calls never interleave a
    // read-modify-write on the backing store
    lock: Arc<Mutex<()>>,
    ttl: Duration,
    code_length: usize,
}

impl OtpManager {
    pub fn new(cache: Arc<dyn TtlCache>, ttl: Duration, code_length: usize) -> Self {
        Self {
            cache,
            lock: Arc::new(Mutex::new(())),
            ttl,
            code_length,
        }
    }

    fn key(owner_id: i64) -> String {
        format!("otp:{}", owner_id)
    }

    /// Generate and store a new code for an owner, invalidating any prior
    /// unconsumed code. Dispatching the code to the owner is the caller's
    /// concern.
    pub async fn issue(&self, owner_id: i64) -> Result<String, ServerError> {
        let code = crypto::generate_login_code(self.code_length);

        let _guard = self.lock.lock().await;
        self.cache.put(&Self::key(owner_id), &code, self.ttl).await?;

        Ok(code)
    }

    /// Check a candidate code. A match consumes the stored code; a
    /// mismatch does not.
    pub async fn verify(&self, owner_id: i64, candidate: &str) -> Result<bool, ServerError> {
        let _guard = self.lock.lock().await;

        let Some(stored) = self.cache.get(&Self::key(owner_id)).await? else {
            return Ok(false);
        };

        if stored == candidate {
            self.cache.delete(&Self::key(owner_id)).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
