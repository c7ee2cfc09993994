//! One-shot delivery state machine.
//!
//! Manages the transition from a fresh socket to a delivered message:
//!
//! ```text
//! Connecting ──001──▶ Registered ──JOIN sent──▶ Joining ──JOIN echo──▶ Joined ──▶ Sent ──▶ Closed
//!      │                                            │
//!      └──────── ERROR / join refused / EOF ────────┴──▶ Failed        (deadline) ──▶ TimedOut
//! ```
//!
//! The machine is pure: it consumes parsed messages and returns the
//! messages to write, leaving all I/O to the engine.

use tracing::{debug, info};

use super::codec::MAX_OUTGOING_LEN;
use super::message::Message;
use crate::error::{RelayError, RelayResult};
use crate::route::Destination;

/// Numerics that mean our JOIN was refused.
const JOIN_FAILURES: &[u16] = &[403, 405, 471, 473, 474, 475, 477];

/// Numerics that end registration.
const REGISTRATION_FAILURES: &[u16] = &[432, 465];

const ERR_NICKNAMEINUSE: u16 = 433;
const RPL_WELCOME: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Socket open, NICK/USER sent, waiting for the welcome.
    Connecting,
    /// Welcome received.
    Registered,
    /// JOIN sent, waiting for our own JOIN echo.
    Joining,
    /// JOIN confirmed.
    Joined,
    /// Every message line written.
    Sent,
    /// Connection shut down after sending.
    Closed,
    Failed,
    /// Deadline passed; reported by the engine after aborting the session task.
    TimedOut,
}

/// What the engine should do after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Write these messages and keep reading.
    Continue(Vec<Message>),
    /// Write these messages, then close the connection.
    Finish(Vec<Message>),
}

/// Identity presented to the IRC server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub nick: String,
    pub user: String,
    pub realname: String,
}

/// State of one delivery attempt. Never reused.
#[derive(Debug)]
pub struct DeliverySession {
    identity: Identity,
    destination: Destination,
    channel: String,
    lines: Vec<String>,
    state: DeliveryState,
}

impl DeliverySession {
    pub fn new(identity: Identity, destination: Destination, message: &str) -> Self {
        let channel = destination.irc_channel();
        Self {
            identity,
            destination,
            channel,
            lines: split_lines(message),
            state: DeliveryState::Connecting,
        }
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    pub fn nick(&self) -> &str {
        &self.identity.nick
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Registration messages written right after connecting.
    pub fn greeting(&self) -> Vec<Message> {
        vec![
            Message::nick(&self.identity.nick),
            Message::user(&self.identity.user, &self.identity.realname),
        ]
    }

    /// Advance the machine with one message from the server.
    pub fn step(&mut self, msg: &Message) -> RelayResult<Step> {
        if msg.command == "PING" {
            return Ok(Step::Continue(vec![Message::pong(&msg.params)]));
        }
        if msg.command == "ERROR" {
            return Err(self.fail(format!("server closed the link: {}", msg.trailing())));
        }

        match self.state {
            DeliveryState::Connecting => self.step_connecting(msg),
            DeliveryState::Joining => self.step_joining(msg),
            _ => Ok(Step::Continue(Vec::new())),
        }
    }

    fn step_connecting(&mut self, msg: &Message) -> RelayResult<Step> {
        match msg.numeric() {
            Some(RPL_WELCOME) => {
                // The server may have altered our nick.
                if let Some(nick) = msg.param(0).filter(|n| !n.is_empty() && *n != "*") {
                    self.identity.nick = nick.to_string();
                }
                self.state = DeliveryState::Registered;
                info!(nick = %self.identity.nick, "Registered");

                let mut out = Vec::new();
                if let Some(recipient) = self.destination.direct_recipient() {
                    out.extend(self.privmsgs(recipient));
                }
                out.push(Message::join(&self.channel));
                self.state = DeliveryState::Joining;
                Ok(Step::Continue(out))
            }
            Some(ERR_NICKNAMEINUSE) => {
                self.identity.nick.push('_');
                debug!(nick = %self.identity.nick, "Nickname in use, retrying");
                Ok(Step::Continue(vec![Message::nick(&self.identity.nick)]))
            }
            Some(code) if REGISTRATION_FAILURES.contains(&code) => Err(self.fail(format!(
                "registration refused ({}): {}",
                code,
                msg.trailing()
            ))),
            _ => Ok(Step::Continue(Vec::new())),
        }
    }

    fn step_joining(&mut self, msg: &Message) -> RelayResult<Step> {
        if msg.command == "JOIN" {
            let ours = msg
                .source_nickname()
                .is_some_and(|n| n.eq_ignore_ascii_case(&self.identity.nick));
            let channel_matches = msg
                .param(0)
                .is_some_and(|c| c.eq_ignore_ascii_case(&self.channel));
            if !(ours && channel_matches) {
                return Ok(Step::Continue(Vec::new()));
            }

            self.state = DeliveryState::Joined;
            info!(channel = %self.channel, "Joined");

            let mut out = self.privmsgs(&self.channel);
            out.push(Message::quit("Message delivered"));
            self.state = DeliveryState::Sent;
            return Ok(Step::Finish(out));
        }

        match msg.numeric() {
            Some(code)
                if JOIN_FAILURES.contains(&code)
                    && msg
                        .param(1)
                        .is_some_and(|c| c.eq_ignore_ascii_case(&self.channel)) =>
            {
                Err(self.fail(format!(
                    "cannot join {} ({}): {}",
                    self.channel,
                    code,
                    msg.trailing()
                )))
            }
            _ => Ok(Step::Continue(Vec::new())),
        }
    }

    /// Record that the connection was shut down after sending.
    pub fn close(&mut self) {
        if self.state == DeliveryState::Sent {
            self.state = DeliveryState::Closed;
        }
    }

    /// Mark the attempt failed and build the matching error.
    pub fn fail(&mut self, reason: impl Into<String>) -> RelayError {
        self.state = DeliveryState::Failed;
        RelayError::IrcProtocolError(reason.into())
    }

    /// One PRIVMSG per line, splitting lines that would overflow the wire limit.
    fn privmsgs(&self, target: &str) -> Vec<Message> {
        // "PRIVMSG <target> :<text>"
        let budget = MAX_OUTGOING_LEN.saturating_sub(target.len() + 10).max(1);
        self.lines
            .iter()
            .flat_map(|line| chunk(line, budget))
            .map(|text| Message::privmsg(target, text))
            .collect()
    }
}

/// Split a message into chat lines: one per line break, carriage returns
/// removed, blank lines dropped.
pub fn split_lines(message: &str) -> Vec<String> {
    message
        .split('\n')
        .map(|line| line.replace('\r', ""))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Split `line` into pieces of at most `max` bytes on char boundaries.
fn chunk(line: &str, max: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line;
    while rest.len() > max {
        let mut cut = max;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            // A single char wider than the budget.
            cut = rest.chars().next().map(char::len_utf8).unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}
