//! A transparent MessagePack <-> JSON transcoding layer for HTTP message streams
//!
//! This crate lets an application written only against JSON transparently
//! serve and accept MessagePack, based on content negotiation headers. It
//! sits between the transport and the application, intercepts the
//! bidirectional message stream, and converts payload bytes in both
//! directions while keeping the protocol invariants intact: headers are sent
//! before the body, `content-length` always matches the emitted body, and
//! requests or responses that do not participate pass through untouched.
//!
//! # Features
//!
//! - Per-request content negotiation from `content-type` and `accept`
//! - Inbound decoding: MessagePack request bodies become JSON before the
//!   application reads them, with `content-type` rewritten to match
//! - Outbound encoding: JSON response bodies become MessagePack, with
//!   `content-type` and `content-length` rewritten consistently
//! - Response headers are withheld until the final body length is known
//! - Pluggable codec functions (defaults: `rmp-serde` and `serde_json`)
//! - Opt-in buffering of multi-chunk bodies (`allow_naive_streaming`)
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use futures::StreamExt;
//! use futures::channel::mpsc;
//! use http::{HeaderMap, HeaderValue, Request, StatusCode};
//! use msgpack_bridge::{
//!     AppResult, Application, Message, MessageSink, MessageSource, MsgpackMiddleware, RequestHead,
//! };
//! use serde_json::json;
//!
//! struct HelloApp;
//!
//! #[async_trait]
//! impl Application for HelloApp {
//!     async fn call(
//!         &self,
//!         _head: &mut RequestHead,
//!         source: &mut dyn MessageSource,
//!         sink: &mut dyn MessageSink,
//!     ) -> AppResult {
//!         // drain the request body; the bridge already turned it into JSON
//!         while let Message::RequestBody { more_body: true, .. } = source.receive().await? {}
//!
//!         let body = serde_json::to_vec(&json!({"message": "Hello, world!"}))?;
//!         let mut headers = HeaderMap::new();
//!         headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
//!         headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from(body.len()));
//!         sink.send(Message::response_headers(StatusCode::OK, headers)).await?;
//!         sink.send(Message::response_body(Bytes::from(body), false)).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let middleware = MsgpackMiddleware::new(HelloApp);
//!
//!     // a client that accepts msgpack: the JSON response gets encoded
//!     let mut head: RequestHead = Request::builder()
//!         .uri("/")
//!         .header(http::header::ACCEPT, "application/vnd.msgpack")
//!         .body(())?
//!         .into();
//!
//!     let (req_tx, req_rx) = mpsc::unbounded();
//!     req_tx.unbounded_send(Message::request_body(Bytes::new(), false))?;
//!     drop(req_tx);
//!     let (resp_tx, mut resp_rx) = mpsc::unbounded();
//!
//!     middleware.call(&mut head, req_rx, resp_tx).await?;
//!
//!     while let Some(message) = resp_rx.next().await {
//!         println!("{message:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: the [`Message`] envelope, the request head, and error types
//! - [`transport`]: the [`MessageSource`]/[`MessageSink`] seams towards the host
//! - [`transcode`]: the per-request streaming transcoder state machines
//! - [`Negotiation`]: the header-driven decision of which directions apply
//! - [`MsgpackMiddleware`]: the composition an application is wrapped in
//!
//! # Negotiation semantics
//!
//! The inbound test is a lenient substring match on `content-type`; this is
//! deliberate and matches widely deployed behavior, at the cost of also
//! matching unrelated media types that contain the configured string. The
//! outbound test is an exact membership test over the comma-separated
//! `accept` values. A response whose declared content-type is not
//! `application/json` is never touched, even if the client asked for
//! MessagePack — the application may well be emitting MessagePack itself via
//! [`MsgpackResponse`].
//!
//! # Limitations
//!
//! - No incremental transcoding: bodies are fully buffered before conversion,
//!   and only when `allow_naive_streaming` is enabled may they arrive in more
//!   than one chunk
//! - Exactly two formats per instance; this is not a general conversion layer
//! - Single-candidate negotiation: one binary media type per instance

pub mod protocol;
pub mod transcode;
pub mod transport;

mod config;
mod handler;
mod middleware;
mod negotiate;
mod response;

pub use config::BinaryDecodeFn;
pub use config::BinaryEncodeFn;
pub use config::BridgeConfig;
pub use config::BridgeConfigBuilder;
pub use config::DEFAULT_BINARY_MEDIA_TYPE;
pub use config::TextDecodeFn;
pub use config::TextEncodeFn;
pub use handler::AppResult;
pub use handler::Application;
pub use middleware::MsgpackMiddleware;
pub use negotiate::Negotiation;
pub use protocol::BridgeError;
pub use protocol::CodecError;
pub use protocol::Message;
pub use protocol::RequestHead;
pub use response::MsgpackResponse;
pub use transport::MessageSink;
pub use transport::MessageSource;
