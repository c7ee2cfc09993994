//! IRC message codec for tokio.
//!
//! Incoming bytes are split with [`LinesCodec`] and parsed into [`Message`]s.
//! Lines that fail to parse, or that exceed the length limit, are logged and
//! skipped instead of ending the stream. Outgoing messages are terminated
//! with CRLF and must not contain a line break themselves.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};
use tracing::debug;

use super::error::ProtocolError;
use super::message::Message;

/// Longest incoming line accepted, tags included.
pub const MAX_INCOMING_LEN: usize = 8191;

/// Longest outgoing line, CRLF excluded.
pub const MAX_OUTGOING_LEN: usize = 510;

/// Tokio codec for encoding/decoding IRC messages.
pub struct IrcCodec {
    lines: LinesCodec,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_INCOMING_LEN),
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, ProtocolError> {
        loop {
            let line = match self.lines.decode(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    debug!(limit = MAX_INCOMING_LEN, "Discarding over-long line");
                    continue;
                }
                Err(LinesCodecError::Io(e)) => return Err(e.into()),
            };

            match line.parse::<Message>() {
                Ok(msg) => return Ok(Some(msg)),
                Err(ProtocolError::EmptyMessage) => continue,
                Err(e) => {
                    debug!(line = %line, error = %e, "Skipping unparseable line");
                    continue;
                }
            }
        }
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = msg.to_string();
        if line.contains(['\r', '\n']) {
            return Err(ProtocolError::LineBreak);
        }
        if line.len() > MAX_OUTGOING_LEN {
            return Err(ProtocolError::MessageTooLong {
                actual: line.len(),
                limit: MAX_OUTGOING_LEN,
            });
        }
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
