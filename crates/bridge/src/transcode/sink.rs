use std::sync::Arc;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use tracing::trace;

use async_trait::async_trait;

use crate::config::BridgeConfig;
use crate::negotiate::Negotiation;
use crate::protocol::{BodyBuffer, BridgeError, Message};
use crate::transport::MessageSink;

/// Outbound path state, per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    /// Waiting for the response headers to decide whether to encode
    AwaitingHeaders,
    /// The response does not participate, everything is forwarded untouched
    Passthrough,
    /// Headers are withheld, body chunks collect into the outbound buffer
    Accumulating,
    /// Headers and transcoded body have been emitted
    Done,
}

/// Wraps the transport's outbound message sink, encoding a JSON response body
/// into MessagePack and rewriting `content-type`/`content-length` to match.
///
/// The response headers event is withheld until the terminal body chunk
/// arrives, so the emitted `content-length` always equals the emitted body
/// length. One instance per request; created detached, wired in with
/// [`TranscodeSink::attach`].
#[derive(Debug)]
pub struct TranscodeSink<W> {
    inner: Option<W>,
    config: Arc<BridgeConfig>,
    negotiation: Negotiation,
    state: SinkState,
    buffer: BodyBuffer,
    pending_headers: Option<(http::StatusCode, HeaderMap)>,
}

impl<W: MessageSink> TranscodeSink<W> {
    pub fn new(config: Arc<BridgeConfig>, negotiation: Negotiation) -> Self {
        let state = if negotiation.encode_response() { SinkState::AwaitingHeaders } else { SinkState::Passthrough };
        Self { inner: None, config, negotiation, state, buffer: BodyBuffer::new(), pending_headers: None }
    }

    /// Wires the transport's sink in.
    pub fn attach(&mut self, inner: W) {
        self.inner = Some(inner);
    }

    /// The negotiation outcome this response currently operates under.
    ///
    /// `encode_response` flips to false once, when the application declares a
    /// non-JSON content-type.
    pub fn negotiation(&self) -> Negotiation {
        self.negotiation
    }

    async fn forward(&mut self, message: Message) -> Result<(), BridgeError> {
        self.inner.as_mut().ok_or(BridgeError::Unattached)?.send(message).await
    }

    async fn on_headers(&mut self, status: http::StatusCode, headers: HeaderMap) -> Result<(), BridgeError> {
        let declared_json = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type == mime::APPLICATION_JSON.as_ref());

        if declared_json {
            // don't send the headers until we know the final body length
            trace!("withholding response headers until the body is transcoded");
            self.pending_headers = Some((status, headers));
            self.state = SinkState::Accumulating;
            Ok(())
        } else {
            // the client accepts msgpack, but the app did not produce json
            // (it may even have produced msgpack itself)
            self.negotiation.clear_encode_response();
            self.state = SinkState::Passthrough;
            self.forward(Message::ResponseHeaders { status, headers }).await
        }
    }

    async fn on_body(&mut self, body: bytes::Bytes, more_body: bool) -> Result<(), BridgeError> {
        if more_body && !self.config.allow_naive_streaming() {
            return Err(BridgeError::streaming_unsupported(
                "response body is streamed in multiple chunks; \
                 enable allow_naive_streaming to buffer chunked response bodies",
            ));
        }
        self.buffer.feed(&body);
        if more_body {
            return Ok(());
        }

        let accumulated = self.buffer.take();
        let value = self.config.from_text(&accumulated)?;
        let encoded = self.config.to_binary(&value)?;
        trace!(json_len = accumulated.len(), msgpack_len = encoded.len(), "encoded response body to msgpack");

        // pending headers are always set while accumulating
        let (status, mut headers) = self.pending_headers.take().unwrap();
        let media_type = HeaderValue::from_str(self.config.binary_media_type())
            .map_err(|e| BridgeError::invalid_header(format!("binary media type: {e}")))?;
        headers.insert(CONTENT_TYPE, media_type);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(encoded.len()));

        self.forward(Message::ResponseHeaders { status, headers }).await?;
        self.forward(Message::response_body(encoded, false)).await?;
        self.state = SinkState::Done;
        Ok(())
    }
}

#[async_trait]
impl<W: MessageSink> MessageSink for TranscodeSink<W> {
    async fn send(&mut self, message: Message) -> Result<(), BridgeError> {
        if self.inner.is_none() {
            return Err(BridgeError::Unattached);
        }

        match self.state {
            SinkState::Passthrough | SinkState::Done => self.forward(message).await,

            SinkState::AwaitingHeaders => match message {
                Message::ResponseHeaders { status, headers } => self.on_headers(status, headers).await,
                other => self.forward(other).await,
            },

            SinkState::Accumulating => match message {
                Message::ResponseBody { body, more_body } => self.on_body(body, more_body).await,
                other => self.forward(other).await,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CodecError;
    use bytes::Bytes;
    use futures::StreamExt;
    use futures::channel::mpsc;
    use http::StatusCode;
    use http::header::ACCEPT;
    use serde_json::{Value, json};

    fn sink_for(accept: Option<&'static str>, config: BridgeConfig) -> (TranscodeSink<mpsc::UnboundedSender<Message>>, mpsc::UnboundedReceiver<Message>) {
        let mut headers = HeaderMap::new();
        if let Some(value) = accept {
            headers.insert(ACCEPT, HeaderValue::from_static(value));
        }
        let config = Arc::new(config);
        let negotiation = Negotiation::negotiate(&mut headers, &config);

        let (tx, rx) = mpsc::unbounded();
        let mut sink = TranscodeSink::new(config, negotiation);
        sink.attach(tx);
        (sink, rx)
    }

    fn json_headers(body_len: usize) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body_len));
        headers
    }

    async fn drain(mut rx: mpsc::UnboundedReceiver<Message>) -> Vec<Message> {
        let mut messages = vec![];
        while let Some(message) = rx.next().await {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn detached_sink_is_fatal() {
        let mut headers = HeaderMap::new();
        let config = Arc::new(BridgeConfig::default());
        let negotiation = Negotiation::negotiate(&mut headers, &config);

        let mut sink: TranscodeSink<mpsc::UnboundedSender<Message>> = TranscodeSink::new(config, negotiation);
        let err = sink.send(Message::Disconnect).await.unwrap_err();
        assert!(matches!(err, BridgeError::Unattached));
    }

    #[tokio::test]
    async fn json_response_is_encoded_with_rewritten_headers() {
        let (mut sink, rx) = sink_for(Some("application/vnd.msgpack"), BridgeConfig::default());

        let body = serde_json::to_vec(&json!({"message": "Hello, world!"})).unwrap();
        sink.send(Message::response_headers(StatusCode::OK, json_headers(body.len()))).await.unwrap();
        sink.send(Message::response_body(Bytes::from(body), false)).await.unwrap();
        drop(sink);

        let messages = drain(rx).await;
        assert_eq!(messages.len(), 2);

        let expected = rmp_serde::to_vec(&json!({"message": "Hello, world!"})).unwrap();
        let Message::ResponseHeaders { status, headers } = &messages[0] else {
            panic!("headers must precede the body, got {:?}", messages[0]);
        };
        assert_eq!(*status, StatusCode::OK);
        assert_eq!(headers.get(CONTENT_TYPE), Some(&HeaderValue::from_static("application/vnd.msgpack")));
        assert_eq!(headers.get(CONTENT_LENGTH), Some(&HeaderValue::from(expected.len())));

        let Message::ResponseBody { body, more_body: false } = &messages[1] else {
            panic!("expected a terminal body, got {:?}", messages[1]);
        };
        assert_eq!(rmp_serde::from_slice::<Value>(body).unwrap(), json!({"message": "Hello, world!"}));
        assert_eq!(body.len(), expected.len());
    }

    #[tokio::test]
    async fn non_json_response_downgrades_to_passthrough() {
        let (mut sink, rx) = sink_for(Some("application/vnd.msgpack"), BridgeConfig::default());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        sink.send(Message::response_headers(StatusCode::OK, headers.clone())).await.unwrap();
        assert!(!sink.negotiation().encode_response(), "downgrade must be permanent");
        sink.send(Message::response_body(Bytes::from_static(b"Hello, world!"), false)).await.unwrap();
        drop(sink);

        let messages = drain(rx).await;
        assert_eq!(messages[0], Message::response_headers(StatusCode::OK, headers));
        assert_eq!(messages[1], Message::response_body(Bytes::from_static(b"Hello, world!"), false));
    }

    #[tokio::test]
    async fn missing_content_type_counts_as_non_json() {
        let (mut sink, rx) = sink_for(Some("application/vnd.msgpack"), BridgeConfig::default());

        sink.send(Message::response_headers(StatusCode::NO_CONTENT, HeaderMap::new())).await.unwrap();
        drop(sink);

        let messages = drain(rx).await;
        assert_eq!(messages, vec![Message::response_headers(StatusCode::NO_CONTENT, HeaderMap::new())]);
    }

    #[tokio::test]
    async fn client_without_accept_gets_passthrough() {
        let (mut sink, rx) = sink_for(None, BridgeConfig::default());

        let body = Bytes::from_static(b"{\"ok\":true}");
        sink.send(Message::response_headers(StatusCode::OK, json_headers(body.len()))).await.unwrap();
        sink.send(Message::response_body(body.clone(), false)).await.unwrap();
        drop(sink);

        let messages = drain(rx).await;
        assert_eq!(messages[1], Message::response_body(body, false));
    }

    #[tokio::test]
    async fn streamed_response_is_rejected_by_default() {
        let (mut sink, _rx) = sink_for(Some("application/vnd.msgpack"), BridgeConfig::default());

        sink.send(Message::response_headers(StatusCode::OK, json_headers(0))).await.unwrap();
        let err = sink.send(Message::response_body(Bytes::from_static(b"{\"a\":"), true)).await.unwrap_err();
        assert!(matches!(err, BridgeError::StreamingUnsupported { .. }));
        assert!(err.to_string().contains("allow_naive_streaming"));
    }

    #[tokio::test]
    async fn naive_streaming_buffers_response_chunks() {
        let config = BridgeConfig::builder().allow_naive_streaming(true).build();
        let (mut sink, rx) = sink_for(Some("application/vnd.msgpack"), config);

        let body = serde_json::to_vec(&json!({"message": "Hello, world!"})).unwrap();
        sink.send(Message::response_headers(StatusCode::OK, json_headers(body.len()))).await.unwrap();
        for chunk in body.chunks(4) {
            sink.send(Message::response_body(Bytes::copy_from_slice(chunk), true)).await.unwrap();
        }
        sink.send(Message::response_body(Bytes::new(), false)).await.unwrap();
        drop(sink);

        let messages = drain(rx).await;
        // identical to the single-chunk case: one headers event, one body event
        assert_eq!(messages.len(), 2);
        let body = messages[1].clone().into_body().unwrap();
        assert_eq!(rmp_serde::from_slice::<Value>(&body).unwrap(), json!({"message": "Hello, world!"}));
    }

    #[tokio::test]
    async fn malformed_json_surfaces_as_codec_error() {
        let (mut sink, _rx) = sink_for(Some("application/vnd.msgpack"), BridgeConfig::default());

        sink.send(Message::response_headers(StatusCode::OK, json_headers(4))).await.unwrap();
        let err = sink.send(Message::response_body(Bytes::from_static(b"{oops"), false)).await.unwrap_err();
        assert!(matches!(err, BridgeError::Codec { source: CodecError::Json { .. } }));
    }
}
