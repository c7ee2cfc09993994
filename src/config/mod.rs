//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, RelayConfig, IrcConfig, PasteConfig)
//! - [`routing`]: Destination shortcut table (RoutingConfig, ShortcutEntry)
//! - [`security`]: Rate limiting configuration (RateLimitConfig, StoreBackend)
//! - [`webhook`]: Webhook template configuration (WebhookConfig, TemplateConfig)
//! - [`validation`]: Startup validation

mod defaults;
mod routing;
mod security;
mod types;
pub mod validation;
mod webhook;

pub use routing::{RoutingConfig, ShortcutEntry};
pub use security::{RateLimitConfig, StoreBackend};
pub use types::{Config, ConfigError, IrcConfig, PasteConfig, RelayConfig};
pub use webhook::{TemplateConfig, WebhookConfig};
