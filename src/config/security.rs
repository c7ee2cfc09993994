//! Rate limiting configuration.

use serde::Deserialize;

use super::defaults;

/// Where rate-limit counters are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Shared Redis at `redis_url`. Required when running as CGI.
    #[default]
    Redis,
    /// Process memory. Counters die with the process.
    Memory,
}

/// Per-address rate limiting.
///
/// `max_per_minute = 0` disables the limiter entirely. Each CGI invocation
/// is a new process, so counters must live in Redis for the limit to hold;
/// `store = "memory"` is for long-lived hosts and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Messages allowed per address within one window (default: 2).
    #[serde(default = "defaults::default_max_per_minute")]
    pub max_per_minute: u64,
    /// Prefix prepended to the remote address to form the store key.
    #[serde(default = "defaults::default_key_prefix")]
    pub key_prefix: String,
    #[serde(default)]
    pub store: StoreBackend,
    /// Redis connection URL (default: `redis://127.0.0.1:6379/`).
    #[serde(default = "defaults::default_redis_url")]
    pub redis_url: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_minute: defaults::default_max_per_minute(),
            key_prefix: defaults::default_key_prefix(),
            store: StoreBackend::default(),
            redis_url: defaults::default_redis_url(),
        }
    }
}
