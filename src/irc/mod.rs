//! Minimal IRC client for one-shot message delivery.
//!
//! - [`message`]: owned message type with parsing and serialization
//! - [`codec`]: tokio codec framing messages over a socket
//! - [`session`]: the registration/join/send state machine
//! - [`delivery`]: connection handling and deadline enforcement

pub mod codec;
pub mod delivery;
pub mod error;
pub mod message;
pub mod session;

pub use codec::IrcCodec;
pub use delivery::DeliveryEngine;
pub use error::ProtocolError;
pub use message::Message;
pub use session::{DeliverySession, DeliveryState, Identity, Step};
