//! Paste service for messages too long to relay verbatim.
//!
//! The text is posted as a single-field multipart form and the service's
//! plain-text reply (normally a URL) replaces it.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::PasteConfig;

/// Result of handing text to a [`LongTextSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    /// Replacement message, or a human-readable failure when `ok` is false.
    pub text: String,
    pub ok: bool,
}

impl Shortened {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: true,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: false,
        }
    }
}

/// Destination for oversized payloads.
#[async_trait]
pub trait LongTextSink: Send + Sync {
    async fn shorten(&self, text: &str) -> Shortened;
}

/// HTTP paste service client.
pub struct PasteService {
    url: String,
    field: String,
    http_client: reqwest::Client,
}

impl PasteService {
    pub fn new(config: &PasteConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("postirc/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            url: config.url.clone(),
            field: config.field.clone(),
            http_client,
        }
    }
}

#[async_trait]
impl LongTextSink for PasteService {
    async fn shorten(&self, text: &str) -> Shortened {
        let form = reqwest::multipart::Form::new().text(self.field.clone(), text.to_string());

        let response = match self.http_client.post(&self.url).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %self.url, error = %e, "Paste request failed");
                return Shortened::failed(format!("Sorry but an error occured: {}", e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = %status, "Paste service rejected the text");
            return Shortened::failed(format!(
                "Sorry but an error occured: paste service returned {}",
                status
            ));
        }

        match response.text().await {
            Ok(body) => {
                let link = body.trim().to_string();
                debug!(url = %self.url, link = %link, "Text pasted");
                Shortened::ok(link)
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Failed to read paste response");
                Shortened::failed(format!("Sorry but an error occured: {}", e))
            }
        }
    }
}
