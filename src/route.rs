//! Destination resolution.
//!
//! Maps request path segments onto a server and channel, either through the
//! configured shortcut table or verbatim.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::{RoutingConfig, ShortcutEntry};
use crate::error::{RelayError, RelayResult};

/// Leading channel character that turns delivery into a private message.
pub const DIRECT_MARKER: char = '-';

/// Where one message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// `host:port`. Always carries a port once resolved.
    pub server: String,
    /// Channel name without `#`, or `-nick` for a private message.
    pub channel: String,
}

impl Destination {
    /// Recipient of a private message, if the channel carries the direct marker.
    pub fn direct_recipient(&self) -> Option<&str> {
        self.channel
            .strip_prefix(DIRECT_MARKER)
            .filter(|nick| !nick.is_empty())
    }

    /// Channel name as sent in JOIN and PRIVMSG.
    pub fn irc_channel(&self) -> String {
        if self.channel.starts_with(['#', '&']) {
            self.channel.clone()
        } else {
            format!("#{}", self.channel)
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.server, self.irc_channel())
    }
}

/// Resolves request paths against the shortcut table.
#[derive(Debug, Clone)]
pub struct Resolver {
    default: String,
    default_port: u16,
    shortcuts: BTreeMap<String, ShortcutEntry>,
}

impl Resolver {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            default: config.default.clone(),
            default_port: config.default_port,
            shortcuts: config.shortcuts.clone(),
        }
    }

    pub fn resolve(&self, path: &[String]) -> RelayResult<Destination> {
        let (server, channel) = match path {
            [] => {
                let entry = self
                    .shortcuts
                    .get(&self.default)
                    .ok_or_else(|| RelayError::UnknownShortcut(self.default.clone()))?;
                (entry.server.clone(), entry.channel.clone())
            }
            [token] => {
                let entry = self
                    .shortcuts
                    .get(token)
                    .ok_or_else(|| RelayError::UnknownShortcut(token.clone()))?;
                (entry.server.clone(), entry.channel.clone())
            }
            [server, channel] => (server.clone(), channel.clone()),
            _ => {
                return Err(RelayError::InvalidRequestShape(format!(
                    "expected at most 2 path segments, got {}",
                    path.len()
                )));
            }
        };

        Ok(Destination {
            server: self.with_port(server),
            channel,
        })
    }

    fn with_port(&self, server: String) -> String {
        if server.contains(':') {
            server
        } else {
            format!("{}:{}", server, self.default_port)
        }
    }

    /// Usage text listing the known shortcuts, one per line.
    pub fn usage(&self, site: &str) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Usage example: cat /etc/pulse/default.pa | curl --data-binary @- {}/irc.dot.org.es:6667/romanian",
                site
            ),
            "Available shortcuts are:".to_string(),
        ];
        lines.extend(
            self.shortcuts
                .iter()
                .map(|(token, entry)| format!("{}: {}, {}", token, entry.server, entry.channel)),
        );
        lines
    }
}
