//! Per-address rate limiting.
//!
//! Fixed one-minute windows counted in a shared [`CounterStore`]:
//!
//! - absent counter: store 1, permit
//! - counter below the threshold: increment, restart the window, permit
//! - counter at the threshold: restart the window without incrementing, deny
//!
//! A client that keeps hammering therefore stays blocked until it has been
//! quiet for a full minute. Reads and writes are separate store calls, so
//! two concurrent requests from one address can both pass; the limit is
//! approximate.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::store::CounterStore;
use crate::config::RateLimitConfig;
use crate::error::{RelayError, RelayResult};

/// Length of one counting window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Fixed-window limiter keyed by remote address.
pub struct RateLimiter {
    max_per_minute: u64,
    key_prefix: String,
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, store: Arc<dyn CounterStore>) -> Self {
        Self {
            max_per_minute: config.max_per_minute,
            key_prefix: config.key_prefix.clone(),
            store,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_per_minute > 0
    }

    /// Count one request from `remote_addr`.
    ///
    /// Fails closed: any store error denies the request.
    pub async fn check(&self, remote_addr: &str) -> RelayResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let key = format!("{}{}", self.key_prefix, remote_addr);
        let current = self.store.get(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Rate limit store read failed");
            RelayError::RateStoreError(e.to_string())
        })?;

        let (next, allowed) = match current {
            None => (1, true),
            Some(count) if count >= self.max_per_minute => (count, false),
            Some(count) => (count + 1, true),
        };

        self.store.set(&key, next, WINDOW).await.map_err(|e| {
            warn!(key = %key, error = %e, "Rate limit store write failed");
            RelayError::RateStoreError(e.to_string())
        })?;

        if allowed {
            debug!(key = %key, count = next, "Rate limit passed");
            Ok(())
        } else {
            debug!(key = %key, count = next, "Rate limit exceeded");
            Err(RelayError::RateLimitExceeded)
        }
    }
}
