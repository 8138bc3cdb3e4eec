//! Short-lived verification code storage.
//!
//! Conductor e-mail verification codes live in a key-value store with a TTL.
//! Expiry is left to the store; nothing sweeps stale entries explicitly.
//!
//! - [`RedisCodeStore`]: Redis-backed store shared by every service instance
//! - [`InMemoryCodeStore`]: process-local store for development and tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::{AppError, AppResult};

/// Key-value store for verification codes.
#[async_trait::async_trait]
pub trait VerificationCodeStore: Send + Sync {
    /// Store a code under `key`, replacing any previous one.
    async fn put(&self, key: &str, code: &str, ttl: Duration) -> AppResult<()>;

    /// Fetch the code stored under `key`, if it has not expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Remove the code stored under `key`.
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// Redis-backed verification code store.
#[derive(Clone)]
pub struct RedisCodeStore {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisCodeStore {
    /// Create a new store. Every key is namespaced with `prefix`.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.prefix)
        }
    }
}

#[async_trait::async_trait]
impl VerificationCodeStore for RedisCodeStore {
    async fn put(&self, key: &str, code: &str, ttl: Duration) -> AppResult<()> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1);

        self.redis
            .set::<(), _, _>(
                self.full_key(key),
                code,
                Some(Expiration::EX(ttl_secs)),
                None,
                false,
            )
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        debug!(key = %key, ttl_secs, "Stored verification code");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.redis
            .get::<Option<String>, _>(self.full_key(key))
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.redis
            .del::<i64, _>(self.full_key(key))
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;
        Ok(())
    }
}

/// In-process verification code store.
///
/// Entries are checked against their deadline on read, so an expired code is
/// never returned even though it may linger in the map until overwritten.
#[derive(Clone, Default)]
pub struct InMemoryCodeStore {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl InMemoryCodeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VerificationCodeStore for InMemoryCodeStore {
    async fn put(&self, key: &str, code: &str, ttl: Duration) -> AppResult<()> {
        let deadline = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (code.to_string(), deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, deadline)| Instant::now() < *deadline)
            .map(|(code, _)| code.clone()))
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_returns_fresh_code() {
        let store = InMemoryCodeStore::new();
        store
            .put("conductor_verification:1", "a1b2c3", Duration::from_secs(60))
            .await
            .unwrap();

        let code = store.get("conductor_verification:1").await.unwrap();
        assert_eq!(code.as_deref(), Some("a1b2c3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_memory_store_expires_code() {
        let store = InMemoryCodeStore::new();
        store
            .put("conductor_verification:2", "ffffff", Duration::from_secs(900))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(901)).await;

        assert!(store.get("conductor_verification:2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_remove() {
        let store = InMemoryCodeStore::new();
        store
            .put("conductor_verification:3", "000001", Duration::from_secs(60))
            .await
            .unwrap();
        store.remove("conductor_verification:3").await.unwrap();

        assert!(store.get("conductor_verification:3").await.unwrap().is_none());
    }
}
