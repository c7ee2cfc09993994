//! Counter stores backing the rate limiter.
//!
//! The store is shared between invocations, so in production it lives
//! outside the process (Redis). [`MemoryCounterStore`] keeps the same
//! get / set-with-expiry contract in process memory.

use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Counter store failures. Absence of a key is not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value counter store with per-key expiry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError>;
    /// Set the value and (re)start its expiry.
    async fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError>;
}

/// Redis-backed store using `GET` and `SET .. EX`.
pub struct RedisCounterStore {
    client: redis::Client,
}

impl RedisCounterStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Build from a URL such as `redis://localhost:6379/0`.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(redis::Client::open(url)?))
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<u64> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: u64,
    expires_at: Instant,
}

/// In-process store. Uses the tokio clock so tests can pause and advance time.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: DashMap<String, Entry>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let now = Instant::now();
        let value = self
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value);
        if value.is_none() {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
