//! Owned IRC message type.
//!
//! Only the subset a one-shot client needs: optional source prefix, a
//! command (word or three-digit numeric) and its parameters. IRCv3 tags on
//! incoming lines are accepted and dropped.

use std::fmt;
use std::str::FromStr;

use super::error::ProtocolError;

/// An IRC message.
///
/// # Example
///
/// ```
/// use postirc::irc::Message;
///
/// let msg: Message = ":nick!user@host JOIN #channel".parse().unwrap();
/// assert_eq!(msg.source_nickname(), Some("nick"));
///
/// let out = Message::privmsg("#channel", "Hello there");
/// assert_eq!(out.to_string(), "PRIVMSG #channel :Hello there");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Source, e.g. `nick!user@host` or a server name.
    pub prefix: Option<String>,
    /// Command name, upper-cased, or a numeric reply code.
    pub command: String,
    pub params: Vec<String>,
}

impl Message {
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn nick(nick: &str) -> Self {
        Self::new("NICK", [nick])
    }

    pub fn user(user: &str, realname: &str) -> Self {
        Self::new("USER", [user, "0", "*", realname])
    }

    pub fn join(channel: &str) -> Self {
        Self::new("JOIN", [channel])
    }

    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG", [target, text])
    }

    pub fn pong(params: &[String]) -> Self {
        Self::new("PONG", params.iter().cloned())
    }

    pub fn quit(reason: &str) -> Self {
        Self::new("QUIT", [reason])
    }

    /// Nickname part of the prefix, if the prefix names a user.
    pub fn source_nickname(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let nick = prefix.split(['!', '@']).next()?;
        // A bare server name has no user part but contains dots.
        if nick.len() == prefix.len() && prefix.contains('.') {
            return None;
        }
        Some(nick)
    }

    /// Numeric reply code, if the command is one.
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Text of the final parameter, used for human-readable replies.
    pub fn trailing(&self) -> &str {
        self.params.last().map(String::as_str).unwrap_or_default()
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if rest.is_empty() {
            return Err(ProtocolError::EmptyMessage);
        }

        if let Some(tagged) = rest.strip_prefix('@') {
            rest = tagged.split_once(' ').map(|(_, r)| r).unwrap_or_default();
            rest = rest.trim_start_matches(' ');
        }

        let prefix = match rest.strip_prefix(':') {
            Some(sourced) => {
                let (prefix, r) = sourced.split_once(' ').unwrap_or((sourced, ""));
                rest = r.trim_start_matches(' ');
                Some(prefix.to_string())
            }
            None => None,
        };

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(ProtocolError::MissingCommand(s.to_string()));
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            let (param, r) = rest.split_once(' ').unwrap_or((rest, ""));
            params.push(param.to_string());
            rest = r;
        }

        Ok(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        f.write_str(&self.command)?;
        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", param)?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }
        Ok(())
    }
}
