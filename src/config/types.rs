//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults;
use super::routing::RoutingConfig;
use super::security::RateLimitConfig;
use super::webhook::WebhookConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Relay configuration.
///
/// Every section is optional in the TOML file; a missing file or an empty
/// one yields the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Identity and message handling.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Destination shortcuts.
    #[serde(default)]
    pub routing: RoutingConfig,
    /// IRC connection timing.
    #[serde(default)]
    pub irc: IrcConfig,
    /// Paste service used for long messages.
    #[serde(default)]
    pub paste: PasteConfig,
    /// Per-address rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Webhook rendering templates.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.as_ref().display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}

/// Relay identity and message handling.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Nickname used on IRC unless the request overrides it.
    #[serde(default = "defaults::default_nick")]
    pub nick: String,
    /// Username sent in USER.
    #[serde(default = "defaults::default_nick")]
    pub user: String,
    /// Realname sent in USER.
    #[serde(default = "defaults::default_nick")]
    pub realname: String,
    /// Messages longer than this many characters go to the paste service.
    #[serde(default = "defaults::default_max_message_len")]
    pub max_message_len: usize,
    /// HTML document printed on GET.
    #[serde(default = "defaults::default_help_page")]
    pub help_page: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            nick: defaults::default_nick(),
            user: defaults::default_nick(),
            realname: defaults::default_nick(),
            max_message_len: defaults::default_max_message_len(),
            help_page: defaults::default_help_page(),
        }
    }
}

/// IRC connection timing.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Seconds allowed for the whole IRC exchange (default: 10).
    #[serde(default = "defaults::default_deadline_secs")]
    pub deadline_secs: u64,
    /// Seconds allowed for the TCP connect (default: 10).
    #[serde(default = "defaults::default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl IrcConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            deadline_secs: defaults::default_deadline_secs(),
            connect_timeout_secs: defaults::default_connect_timeout_secs(),
        }
    }
}

/// Paste service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PasteConfig {
    /// Endpoint receiving the multipart POST.
    #[serde(default = "defaults::default_paste_url")]
    pub url: String,
    /// Name of the single form field carrying the text.
    #[serde(default = "defaults::default_paste_field")]
    pub field: String,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "defaults::default_paste_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            url: defaults::default_paste_url(),
            field: defaults::default_paste_field(),
            timeout_secs: defaults::default_paste_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.relay.nick, "postirc");
        assert_eq!(config.relay.max_message_len, 400);
        assert_eq!(config.irc.deadline_secs, 10);
        assert_eq!(config.paste.field, "f:1");
        assert_eq!(config.rate_limit.max_per_minute, 2);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[relay]
nick = "hookbot"

[irc]
deadline_secs = 3
"#,
        )
        .unwrap();
        assert_eq!(config.relay.nick, "hookbot");
        assert_eq!(config.relay.user, "postirc");
        assert_eq!(config.irc.deadline(), Duration::from_secs(3));
        assert_eq!(config.irc.connect_timeout_secs, 10);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.routing.default, "ro");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[relay\nnick = ").unwrap();
        let result = Config::load_or_default(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
