//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::routing::ShortcutEntry;
use super::webhook::TemplateConfig;

// =============================================================================
// Relay Defaults
// =============================================================================

pub fn default_nick() -> String {
    "postirc".to_string()
}

pub fn default_max_message_len() -> usize {
    400
}

pub fn default_help_page() -> PathBuf {
    PathBuf::from("index.html")
}

// =============================================================================
// Routing Defaults
// =============================================================================

pub fn default_shortcut() -> String {
    "ro".to_string()
}

pub fn default_port() -> u16 {
    6667
}

pub fn default_shortcuts() -> BTreeMap<String, ShortcutEntry> {
    BTreeMap::from([
        (
            "linux".to_string(),
            ShortcutEntry::new("irc.libera.chat:6667", "linux"),
        ),
        (
            "ro".to_string(),
            ShortcutEntry::new("irc.dot.org.es:6667", "romanian"),
        ),
    ])
}

// =============================================================================
// IRC Defaults
// =============================================================================

pub fn default_deadline_secs() -> u64 {
    10
}

pub fn default_connect_timeout_secs() -> u64 {
    10
}

// =============================================================================
// Paste Defaults
// =============================================================================

pub fn default_paste_url() -> String {
    "http://ix.io".to_string()
}

pub fn default_paste_field() -> String {
    "f:1".to_string()
}

pub fn default_paste_timeout_secs() -> u64 {
    10
}

// =============================================================================
// Rate Limit Defaults
// =============================================================================

pub fn default_max_per_minute() -> u64 {
    2
}

pub fn default_key_prefix() -> String {
    "postirc_".to_string()
}

pub fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

// =============================================================================
// Webhook Defaults
// =============================================================================

pub fn default_templates() -> Vec<TemplateConfig> {
    vec![
        TemplateConfig {
            ref_prefix: "refs/heads/".to_string(),
            format: "[{}] {} pushed to {}: {} {}".to_string(),
            paths: vec![
                "repository.name".to_string(),
                "sender.login".to_string(),
                "self".to_string(),
                "head_commit.message".to_string(),
                "repository.url".to_string(),
            ],
        },
        TemplateConfig {
            ref_prefix: "refs/tags/v".to_string(),
            format: "[{}] {} released version {} {}".to_string(),
            paths: vec![
                "repository.name".to_string(),
                "sender.login".to_string(),
                "self".to_string(),
                "repository.url".to_string(),
            ],
        },
    ]
}
