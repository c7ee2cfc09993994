//! Destination shortcut configuration.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::defaults;

/// Shortcut table: token → server/channel pair, with a designated default.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Shortcut token used when the request path is empty.
    #[serde(default = "defaults::default_shortcut")]
    pub default: String,
    /// Port appended to servers given without one.
    #[serde(default = "defaults::default_port")]
    pub default_port: u16,
    /// Known shortcuts.
    #[serde(default = "defaults::default_shortcuts")]
    pub shortcuts: BTreeMap<String, ShortcutEntry>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default: defaults::default_shortcut(),
            default_port: defaults::default_port(),
            shortcuts: defaults::default_shortcuts(),
        }
    }
}

/// A server/channel pair named by a shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShortcutEntry {
    pub server: String,
    pub channel: String,
}

impl ShortcutEntry {
    pub fn new(server: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            channel: channel.into(),
        }
    }
}
