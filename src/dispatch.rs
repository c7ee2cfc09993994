//! Request dispatch.
//!
//! Sequences one relay request: resolve the destination, produce the final
//! message text, apply the rate limit, deliver, and report. Every failure
//! becomes exactly one line of output.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, info, warn};

use crate::config::Config;
use crate::error::{RelayError, RelayResult};
use crate::irc::{DeliveryEngine, Identity};
use crate::paste::LongTextSink;
use crate::request::{InboundRequest, Method};
use crate::route::Resolver;
use crate::security::{CounterStore, RateLimiter};
use crate::telemetry::spans;
use crate::webhook::TemplateEngine;

/// Header line printed before every response body.
pub const CONTENT_TYPE: &str = "Content-Type: text/html; charset=utf-8";

/// Line printed after a successful delivery.
pub const SUCCESS_LINE: &str = "Sent successfully!";

const MAX_NICK_LEN: usize = 30;

/// Text written back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub lines: Vec<String>,
    /// Set when delivery succeeded.
    pub delivered: bool,
    /// Index into `lines` of the success or error line; `None` for GET.
    pub status: Option<usize>,
}

impl Response {
    /// Full CGI output: header, blank line, body.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n\n", CONTENT_TYPE);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// The success or error line of a POST, ignoring any usage text after it.
    pub fn outcome(&self) -> Option<&str> {
        self.status
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }
}

/// Orchestrates one relay request.
pub struct Dispatcher {
    identity: Identity,
    max_message_len: usize,
    help_page: PathBuf,
    resolver: Resolver,
    templates: TemplateEngine,
    sink: Arc<dyn LongTextSink>,
    limiter: RateLimiter,
    engine: DeliveryEngine,
}

impl Dispatcher {
    pub fn new(
        config: &Config,
        sink: Arc<dyn LongTextSink>,
        store: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            identity: Identity {
                nick: config.relay.nick.clone(),
                user: config.relay.user.clone(),
                realname: config.relay.realname.clone(),
            },
            max_message_len: config.relay.max_message_len,
            help_page: config.relay.help_page.clone(),
            resolver: Resolver::new(&config.routing),
            templates: TemplateEngine::new(&config.webhook),
            sink,
            limiter: RateLimiter::new(&config.rate_limit, store),
            engine: DeliveryEngine::new(&config.irc),
        }
    }

    /// Replace the delivery engine, e.g. to shorten its deadline.
    pub fn with_engine(mut self, engine: DeliveryEngine) -> Self {
        self.engine = engine;
        self
    }

    pub async fn handle(&self, req: &InboundRequest) -> Response {
        let method = match &req.method {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(m) => m.as_str(),
        };
        let span = spans::request(method, &req.remote_addr);

        async {
            if req.method == Method::Get {
                return Response {
                    lines: vec![self.help_page().await],
                    delivered: false,
                    status: None,
                };
            }

            let mut lines = Vec::new();
            match self.relay(req, &mut lines).await {
                Ok(()) => {
                    info!("Message relayed");
                    lines.push(SUCCESS_LINE.to_string());
                    Response {
                        status: Some(lines.len() - 1),
                        lines,
                        delivered: true,
                    }
                }
                Err(e) => {
                    warn!(code = e.error_code(), error = %e, "Relay failed");
                    lines.push(e.to_string());
                    let status = Some(lines.len() - 1);
                    if e.wants_usage() {
                        lines.extend(self.resolver.usage(&self.identity.nick));
                    }
                    Response {
                        lines,
                        delivered: false,
                        status,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn relay(&self, req: &InboundRequest, lines: &mut Vec<String>) -> RelayResult<()> {
        if let Method::Other(m) = &req.method {
            return Err(RelayError::InvalidRequestShape(format!(
                "method {} is not supported",
                m
            )));
        }

        let destination = self.resolver.resolve(&req.path)?;
        let message = self.message_text(req).await?;
        self.limiter.check(&req.remote_addr).await?;

        info!(server = %destination.server, channel = %destination.channel, "Relaying message");
        lines.push(format!("Sending to {}", destination));

        self.engine
            .send(self.identity_for(req), &destination, &message)
            .await?;
        Ok(())
    }

    /// Final text to deliver: rendered webhook, pasted link, or the raw body.
    async fn message_text(&self, req: &InboundRequest) -> RelayResult<String> {
        if req.is_webhook() {
            let line = self.templates.render_body(&req.body)?;
            if line.trim().is_empty() {
                return Err(RelayError::EmptyMessage);
            }
            return Ok(line);
        }

        let body = req.body_text();
        if body.trim().is_empty() {
            return Err(RelayError::EmptyMessage);
        }
        if body.chars().count() <= self.max_message_len {
            return Ok(body);
        }

        let shortened = self.sink.shorten(&body).await;
        if shortened.ok {
            info!(link = %shortened.text, "Long message pasted");
            Ok(shortened.text)
        } else {
            Err(RelayError::PasteServiceFailure(shortened.text))
        }
    }

    fn identity_for(&self, req: &InboundRequest) -> Identity {
        let mut identity = self.identity.clone();
        if let Some(nick) = req.nick.as_deref().and_then(sanitize_nick) {
            identity.nick = nick;
        }
        identity
    }

    async fn help_page(&self) -> String {
        match tokio::fs::read_to_string(&self.help_page).await {
            Ok(page) => page,
            Err(e) => {
                warn!(path = %self.help_page.display(), error = %e, "Failed to read help page");
                self.resolver.usage(&self.identity.nick).join("\n")
            }
        }
    }
}

/// Keep only characters valid in a nickname; `None` when nothing usable is left.
fn sanitize_nick(raw: &str) -> Option<String> {
    let nick: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "-_[]\\`^{}|".contains(*c))
        .take(MAX_NICK_LEN)
        .collect();
    match nick.chars().next() {
        Some(first) if !first.is_ascii_digit() && first != '-' => Some(nick),
        _ => None,
    }
}
