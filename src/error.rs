//! Unified error handling for postirc.
//!
//! Every failure a relay request can hit is a [`RelayError`]. The dispatcher
//! turns each one into a single user-facing line, so the `Display` text of a
//! variant is exactly what the HTTP caller reads.

use thiserror::Error;

/// Errors that terminate a relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid request: {0}")]
    InvalidRequestShape(String),

    #[error("Unknown shortcut: {0}")]
    UnknownShortcut(String),

    #[error("Nothing to send: the message is empty")]
    EmptyMessage,

    /// Carries the text produced by the paste sink.
    #[error("{0}")]
    PasteServiceFailure(String),

    #[error("Malformed webhook: {0}")]
    MalformedWebhook(String),

    #[error("No webhook template matches ref '{0}'")]
    NoTemplateMatch(String),

    #[error("Webhook field '{path}' could not be resolved: {reason}")]
    PathResolutionError { path: String, reason: String },

    #[error("Error accessing database")]
    RateStoreError(String),

    #[error("You have reached the limit of messages per minute. Please try again later.")]
    RateLimitExceeded,

    #[error("Failed to connect to that irc server!")]
    ConnectFailed(String),

    #[error("IRC error: {0}")]
    IrcProtocolError(String),

    #[error("Timeout sending message. Please try again later.")]
    DeliveryTimeout,
}

impl RelayError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequestShape(_) => "invalid_request_shape",
            Self::UnknownShortcut(_) => "unknown_shortcut",
            Self::EmptyMessage => "empty_message",
            Self::PasteServiceFailure(_) => "paste_service_failure",
            Self::MalformedWebhook(_) => "malformed_webhook",
            Self::NoTemplateMatch(_) => "no_template_match",
            Self::PathResolutionError { .. } => "path_resolution_error",
            Self::RateStoreError(_) => "rate_store_error",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::ConnectFailed(_) => "connect_failed",
            Self::IrcProtocolError(_) => "irc_protocol_error",
            Self::DeliveryTimeout => "delivery_timeout",
        }
    }

    /// Whether the usage text should follow this error in the response.
    pub fn wants_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequestShape(_) | Self::UnknownShortcut(_)
        )
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
