//! Logging setup and span constructors.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Logs go to stderr: stdout carries the CGI response. `RUST_LOG` overrides
/// the default `info` filter.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Standardized span constructors for relay observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for one inbound request.
    pub fn request(method: &str, remote_addr: &str) -> Span {
        info_span!("request", method = %method, remote = %remote_addr)
    }

    /// Create a span for one IRC delivery attempt.
    pub fn delivery(nick: &str, lines: usize) -> Span {
        info_span!("delivery", nick = %nick, lines = lines)
    }
}
