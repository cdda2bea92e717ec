//! Core protocol abstractions for the transcoding layer.
//!
//! This module provides the building blocks the rest of the crate is written
//! against:
//!
//! - **Message Handling** ([`message`]): the [`Message`] envelope carrying
//!   request body chunks, disconnects, response headers and response body
//!   chunks
//!
//! - **Request Head** ([`head`]): [`RequestHead`] wraps the request line and
//!   header set; the negotiator rewrites headers through it
//!
//! - **Body Buffering** ([`buffer`]): per-request append-only accumulator used
//!   by both transcoding directions
//!
//! - **Error Handling** ([`error`]): [`BridgeError`] and [`CodecError`]
//!
//! Messages arrive from and are delivered to the transport through the traits
//! in [`crate::transport`]; this module defines only the data that flows.

mod message;
pub use message::Message;

mod head;
pub use head::RequestHead;

mod error;
pub use error::BridgeError;
pub use error::CodecError;

mod buffer;
pub(crate) use buffer::BodyBuffer;
