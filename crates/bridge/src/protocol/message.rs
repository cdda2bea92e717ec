use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// Represents one event in either stream direction.
///
/// This enum is the envelope the transcoder interposes on: body chunks flow
/// towards the application, header and body events flow back towards the
/// client. Non-body events (such as [`Message::Disconnect`]) are always
/// forwarded unmodified.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A chunk of the request body; `more_body` signals a continuation
    RequestBody { body: Bytes, more_body: bool },
    /// The transport lost the client
    Disconnect,
    /// The response status line and header set, sent exactly once per request
    ResponseHeaders { status: StatusCode, headers: HeaderMap },
    /// A chunk of the response body; `more_body` signals a continuation
    ResponseBody { body: Bytes, more_body: bool },
}

impl Message {
    /// Creates a request body chunk message
    pub fn request_body(body: impl Into<Bytes>, more_body: bool) -> Self {
        Self::RequestBody { body: body.into(), more_body }
    }

    /// Creates a response headers message
    pub fn response_headers(status: StatusCode, headers: HeaderMap) -> Self {
        Self::ResponseHeaders { status, headers }
    }

    /// Creates a response body chunk message
    pub fn response_body(body: impl Into<Bytes>, more_body: bool) -> Self {
        Self::ResponseBody { body: body.into(), more_body }
    }

    /// Returns true if this message is a request body chunk
    #[inline]
    pub fn is_request_body(&self) -> bool {
        matches!(self, Message::RequestBody { .. })
    }

    /// Returns true if this message is a response headers event
    #[inline]
    pub fn is_response_headers(&self) -> bool {
        matches!(self, Message::ResponseHeaders { .. })
    }

    /// Returns true if this message is a response body chunk
    #[inline]
    pub fn is_response_body(&self) -> bool {
        matches!(self, Message::ResponseBody { .. })
    }

    /// Returns true if this message is a disconnect signal
    #[inline]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Message::Disconnect)
    }

    /// Consumes the message and returns the carried body bytes, if any
    ///
    /// Returns None for header and disconnect events
    pub fn into_body(self) -> Option<Bytes> {
        match self {
            Message::RequestBody { body, .. } | Message::ResponseBody { body, .. } => Some(body),
            Message::Disconnect | Message::ResponseHeaders { .. } => None,
        }
    }
}

/// Converts bytes into a terminal request body message
///
/// This allows bytes to be directly converted into a Message for sending
/// a complete request body in one frame.
impl From<Bytes> for Message {
    fn from(bytes: Bytes) -> Self {
        Self::RequestBody { body: bytes, more_body: false }
    }
}
