//! Companion response type for applications that want to produce
//! MessagePack directly, without relying on negotiation.
//!
//! A [`MsgpackResponse`] declares the binary media type up front, so the
//! outbound transcoding path sees a non-JSON content-type and passes the
//! response through untouched.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;

use crate::config::{DEFAULT_BINARY_MEDIA_TYPE, default_encode_binary};
use crate::protocol::{BridgeError, CodecError, Message};
use crate::transport::MessageSink;

/// A response whose render step is the binary encoding of its content.
#[derive(Debug)]
pub struct MsgpackResponse {
    status: StatusCode,
    headers: HeaderMap,
    media_type: String,
    content: Value,
}

impl MsgpackResponse {
    /// Creates a `200 OK` response carrying `content`.
    pub fn new(content: Value) -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), media_type: DEFAULT_BINARY_MEDIA_TYPE.to_string(), content }
    }

    /// Overrides the response status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Overrides the declared media type, e.g. `application/x-msgpack`.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Adds an extra header; `content-type` and `content-length` are managed
    /// by the response itself.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Encodes the content as MessagePack.
    pub fn render(&self) -> Result<Bytes, CodecError> {
        default_encode_binary(&self.content)
    }

    /// Emits the response as one headers event followed by one terminal body
    /// event, with `content-length` matching the rendered body.
    pub async fn send(self, sink: &mut dyn MessageSink) -> Result<(), BridgeError> {
        let body = self.render()?;

        let mut headers = self.headers;
        let media_type = HeaderValue::from_str(&self.media_type).map_err(|e| BridgeError::invalid_header(format!("media type: {e}")))?;
        headers.insert(CONTENT_TYPE, media_type);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        sink.send(Message::ResponseHeaders { status: self.status, headers }).await?;
        sink.send(Message::response_body(body, false)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::channel::mpsc;
    use serde_json::json;

    #[test]
    fn render_is_the_binary_encoding() {
        let response = MsgpackResponse::new(json!({"message": "Hello, world!"}));
        let expected = rmp_serde::to_vec(&json!({"message": "Hello, world!"})).unwrap();
        assert_eq!(response.render().unwrap(), Bytes::from(expected));
    }

    #[tokio::test]
    async fn send_emits_headers_then_terminal_body() {
        let (mut tx, mut rx) = mpsc::unbounded();

        let response = MsgpackResponse::new(json!({"ok": true})).with_status(StatusCode::CREATED);
        let body = response.render().unwrap();
        response.send(&mut tx).await.unwrap();
        drop(tx);

        let Some(Message::ResponseHeaders { status, headers }) = rx.next().await else {
            panic!("expected a headers event first");
        };
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers.get(CONTENT_TYPE), Some(&HeaderValue::from_static("application/vnd.msgpack")));
        assert_eq!(headers.get(CONTENT_LENGTH), Some(&HeaderValue::from(body.len())));

        assert_eq!(rx.next().await, Some(Message::response_body(body, false)));
        assert_eq!(rx.next().await, None);
    }
}
