use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::trace;

use async_trait::async_trait;

use crate::config::BridgeConfig;
use crate::negotiate::Negotiation;
use crate::protocol::{BodyBuffer, BridgeError, Message};
use crate::transport::MessageSource;

/// Inbound path state, per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceState {
    /// Negotiation decided the request does not participate
    Passthrough,
    /// Body chunks are being collected into the inbound buffer
    Accumulating,
    /// The terminal chunk has been delivered, everything else passes through
    Done,
}

/// Wraps the transport's inbound message source, replacing a MessagePack
/// request body with its JSON rendition before the application sees it.
///
/// One instance per request. Created detached; the transport's real source is
/// wired in with [`TranscodeSource::attach`], and pulling from a detached
/// source is a fatal [`BridgeError::Unattached`].
#[derive(Debug)]
pub struct TranscodeSource<R> {
    inner: Option<R>,
    config: Arc<BridgeConfig>,
    state: SourceState,
    buffer: BodyBuffer,
}

impl<R: MessageSource> TranscodeSource<R> {
    pub fn new(config: Arc<BridgeConfig>, negotiation: Negotiation) -> Self {
        let state = if negotiation.decode_request() { SourceState::Accumulating } else { SourceState::Passthrough };
        Self { inner: None, config, state, buffer: BodyBuffer::new() }
    }

    /// Wires the transport's source in.
    pub fn attach(&mut self, inner: R) {
        self.inner = Some(inner);
    }

    fn on_message(&mut self, message: Message) -> Result<Message, BridgeError> {
        let (body, more_body) = match message {
            Message::RequestBody { body, more_body } => (body, more_body),
            // disconnects and anything else pass through in every state
            other => return Ok(other),
        };

        if !body.is_empty() && self.buffer.chunks() > 0 && !self.config.allow_naive_streaming() {
            return Err(BridgeError::streaming_unsupported(
                "request body arrived in multiple chunks; \
                 enable allow_naive_streaming to buffer chunked request bodies",
            ));
        }
        self.buffer.feed(&body);

        if more_body {
            // hold the data back until the body is complete
            return Ok(Message::request_body(Bytes::new(), true));
        }

        let json = if self.buffer.is_empty() {
            self.config.to_text(&Value::Object(Map::new()))?
        } else {
            let accumulated = self.buffer.take();
            let value = self.config.from_binary(&accumulated)?;
            self.config.to_text(&value)?
        };
        trace!(len = json.len(), "decoded request body to json");

        self.state = SourceState::Done;
        Ok(Message::request_body(json, false))
    }
}

#[async_trait]
impl<R: MessageSource> MessageSource for TranscodeSource<R> {
    async fn receive(&mut self) -> Result<Message, BridgeError> {
        let message = self.inner.as_mut().ok_or(BridgeError::Unattached)?.receive().await?;

        match self.state {
            SourceState::Passthrough | SourceState::Done => Ok(message),
            SourceState::Accumulating => self.on_message(message),
        }
    }
}
