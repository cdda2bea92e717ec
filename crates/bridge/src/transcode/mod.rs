//! The streaming transcoder.
//!
//! Two wrappers interpose on the transport, one per direction:
//!
//! - [`TranscodeSource`] sits on the inbound path and replaces a fully
//!   received MessagePack request body with its JSON rendition
//! - [`TranscodeSink`] sits on the outbound path, withholds the response
//!   headers event until the terminal body chunk arrived, and emits the
//!   header-consistent MessagePack response
//!
//! Both wrappers run a small per-request state machine. Under the default
//! policy a body must arrive in a single chunk; the opt-in naive streaming
//! policy fully buffers multi-chunk bodies before transcoding instead of
//! rejecting them. Neither mode converts incrementally.

mod source;
pub use source::TranscodeSource;

mod sink;
pub use sink::TranscodeSink;
