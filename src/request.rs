//! Inbound request model.
//!
//! The web server hands us a CGI environment and the body on stdin. This
//! module turns that into an immutable [`InboundRequest`].

use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};

/// HTTP method of the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" | "HEAD" => Self::Get,
            "POST" | "PUT" => Self::Post,
            _ => Self::Other(raw.to_string()),
        }
    }
}

/// One relay request, built once per invocation.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Non-empty path segments, query string removed.
    pub path: Vec<String>,
    /// Client address, used as the rate limit key.
    pub remote_addr: String,
    /// Nickname override from the `X-Irc-Nick` header.
    pub nick: Option<String>,
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl InboundRequest {
    /// Build a request from CGI environment variables and a body reader.
    ///
    /// `CONTENT_LENGTH`, when present and valid, bounds how much of the body
    /// is read.
    pub async fn from_cgi<R>(env: &HashMap<String, String>, mut body: R) -> std::io::Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let var = |name: &str| env.get(name).filter(|v| !v.is_empty()).cloned();

        let mut buf = Vec::new();
        match var("CONTENT_LENGTH").and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(len) => {
                body.take(len).read_to_end(&mut buf).await?;
            }
            None => {
                body.read_to_end(&mut buf).await?;
            }
        }

        Ok(Self {
            method: Method::parse(&var("REQUEST_METHOD").unwrap_or_default()),
            path: split_path(&var("REQUEST_URI").unwrap_or_default()),
            remote_addr: var("REMOTE_ADDR").unwrap_or_default(),
            nick: var("HTTP_X_IRC_NICK").map(|n| n.trim().to_string()),
            content_type: var("CONTENT_TYPE"),
            body: buf,
        })
    }

    /// Whether the body should be treated as a webhook document.
    pub fn is_webhook(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
    }

    /// Body decoded as text, invalid UTF-8 replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Split a request URI into non-empty path segments.
pub fn split_path(uri: &str) -> Vec<String> {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
