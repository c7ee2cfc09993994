//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, StoreBackend};
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("relay.nick must be non-empty and contain no spaces, got '{0}'")]
    InvalidNick(String),
    #[error("relay.max_message_len must be greater than zero")]
    ZeroMessageLength,
    #[error("irc.deadline_secs must be greater than zero")]
    ZeroDeadline,
    #[error("routing.default '{0}' is not a configured shortcut")]
    UnknownDefaultShortcut(String),
    #[error("paste.url must be an http(s) URL, got '{0}'")]
    InvalidPasteUrl(String),
    #[error("rate_limit.redis_url must be a redis:// or unix:// URL, got '{0}'")]
    InvalidRedisUrl(String),
    #[error("webhook template '{prefix}' has {placeholders} placeholders but {paths} paths")]
    TemplateArity {
        prefix: String,
        placeholders: usize,
        paths: usize,
    },
    #[error("webhook template '{prefix}' has an empty key in path '{path}'")]
    EmptyPathSegment { prefix: String, path: String },
}

const REDIS_SCHEMES: &[&str] = &["redis://", "rediss://", "unix://", "redis+unix://"];

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let nick = &config.relay.nick;
    if nick.is_empty() || nick.contains(char::is_whitespace) {
        errors.push(ValidationError::InvalidNick(nick.clone()));
    }
    if config.relay.max_message_len == 0 {
        errors.push(ValidationError::ZeroMessageLength);
    }
    if config.irc.deadline_secs == 0 {
        errors.push(ValidationError::ZeroDeadline);
    }

    if !config
        .routing
        .shortcuts
        .contains_key(&config.routing.default)
    {
        errors.push(ValidationError::UnknownDefaultShortcut(
            config.routing.default.clone(),
        ));
    }

    let url = &config.paste.url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ValidationError::InvalidPasteUrl(url.clone()));
    }

    let limit = &config.rate_limit;
    if limit.max_per_minute > 0
        && limit.store == StoreBackend::Redis
        && !REDIS_SCHEMES.iter().any(|s| limit.redis_url.starts_with(s))
    {
        errors.push(ValidationError::InvalidRedisUrl(limit.redis_url.clone()));
    }

    for template in &config.webhook.templates {
        let placeholders = template.placeholder_count();
        if placeholders != template.paths.len() {
            errors.push(ValidationError::TemplateArity {
                prefix: template.ref_prefix.clone(),
                placeholders,
                paths: template.paths.len(),
            });
        }
        for path in &template.paths {
            if path.split('.').any(str::is_empty) {
                errors.push(ValidationError::EmptyPathSegment {
                    prefix: template.ref_prefix.clone(),
                    path: path.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
