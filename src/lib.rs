//! postirc - relay an HTTP request body to IRC.
//!
//! Each process handles one request: the body (or a paste link to it, or a
//! line rendered from a webhook document) is delivered to an IRC channel by
//! a short-lived client that registers, joins, speaks and quits.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod irc;
pub mod paste;
pub mod request;
pub mod route;
pub mod security;
pub mod telemetry;
pub mod webhook;

pub use config::Config;
pub use dispatch::{Dispatcher, Response};
pub use error::{RelayError, RelayResult};
pub use request::{InboundRequest, Method};
pub use route::{Destination, Resolver};
