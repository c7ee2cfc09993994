//! Abuse protection.
//!
//! Provides the per-address [`RateLimiter`] and the counter stores behind it.

pub mod rate_limit;
pub mod store;

pub use rate_limit::RateLimiter;
pub use store::{CounterStore, MemoryCounterStore, RedisCounterStore, StoreError};

use std::sync::Arc;
use tracing::info;

use crate::config::{RateLimitConfig, StoreBackend};

/// Build the counter store named by the configuration.
pub fn counter_store(config: &RateLimitConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
    match config.store {
        StoreBackend::Redis => {
            info!(host = %redis_host(&config.redis_url), "Using Redis rate limit store");
            Ok(Arc::new(RedisCounterStore::open(&config.redis_url)?))
        }
        StoreBackend::Memory => {
            info!("Using in-memory rate limit store");
            Ok(Arc::new(MemoryCounterStore::new()))
        }
    }
}

/// Host part of a Redis URL, without credentials or query.
fn redis_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, r)| r);
    let rest = rest.split('?').next().unwrap_or(rest);
    let authority = rest.split('/').next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or(authority);
    // unix:///path/to/socket has no authority.
    if host.is_empty() { rest } else { host }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_host_drops_credentials() {
        assert_eq!(redis_host("redis://:secret@cache.internal:6380/0"), "cache.internal:6380");
        assert_eq!(redis_host("rediss://user:pw@h/"), "h");
        assert_eq!(redis_host("redis://127.0.0.1:6379/"), "127.0.0.1:6379");
        assert_eq!(redis_host("unix:///run/redis.sock?pass=secret"), "/run/redis.sock");
    }

    #[test]
    fn default_config_uses_redis() {
        // Opening a client does not connect, so no server is needed here.
        assert!(counter_store(&RateLimitConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn memory_store_on_request() {
        let config = RateLimitConfig {
            store: StoreBackend::Memory,
            ..RateLimitConfig::default()
        };
        let store = counter_store(&config).unwrap();
        store.set("k", 1, std::time::Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(1));
    }
}
