//! Bridge configuration and injected codec functions.
//!
//! The two payload formats are not hardwired into the transcoder: both the
//! binary (MessagePack) and textual (JSON) side are injected as
//! function-typed configuration fields, defaulting to `rmp-serde` and
//! `serde_json`. Swapping one out (for example `application/x-msgpack` with a
//! codec that tweaks string handling) is a matter of building a config with
//! different functions, not of implementing a trait hierarchy.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::protocol::CodecError;

/// The IANA-registered media type for MessagePack.
///
/// Older implementations used `application/x-msgpack`; configure
/// [`BridgeConfigBuilder::binary_media_type`] to interoperate with those.
pub const DEFAULT_BINARY_MEDIA_TYPE: &str = "application/vnd.msgpack";

/// Encodes a value into binary-format bytes.
pub type BinaryEncodeFn = Arc<dyn Fn(&Value) -> Result<Bytes, CodecError> + Send + Sync>;
/// Decodes binary-format bytes into a value.
pub type BinaryDecodeFn = Arc<dyn Fn(&[u8]) -> Result<Value, CodecError> + Send + Sync>;
/// Encodes a value into textual-format bytes.
pub type TextEncodeFn = Arc<dyn Fn(&Value) -> Result<Bytes, CodecError> + Send + Sync>;
/// Decodes textual-format bytes into a value.
pub type TextDecodeFn = Arc<dyn Fn(&[u8]) -> Result<Value, CodecError> + Send + Sync>;

pub(crate) fn default_encode_binary(value: &Value) -> Result<Bytes, CodecError> {
    Ok(Bytes::from(rmp_serde::to_vec(value)?))
}

pub(crate) fn default_decode_binary(data: &[u8]) -> Result<Value, CodecError> {
    Ok(rmp_serde::from_slice(data)?)
}

fn default_encode_text(value: &Value) -> Result<Bytes, CodecError> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

fn default_decode_text(data: &[u8]) -> Result<Value, CodecError> {
    Ok(serde_json::from_slice(data)?)
}

/// Per-instance configuration of the transcoding layer.
///
/// Constructed once and shared across requests; all per-request state lives
/// in the transcoding wrappers instead.
#[derive(Clone)]
pub struct BridgeConfig {
    binary_media_type: String,
    allow_naive_streaming: bool,
    encode_binary: BinaryEncodeFn,
    decode_binary: BinaryDecodeFn,
    encode_text: TextEncodeFn,
    decode_text: TextDecodeFn,
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// The media type negotiated against and stamped on encoded responses.
    pub fn binary_media_type(&self) -> &str {
        &self.binary_media_type
    }

    /// Whether multi-chunk bodies are accepted and fully buffered.
    pub fn allow_naive_streaming(&self) -> bool {
        self.allow_naive_streaming
    }

    pub(crate) fn to_binary(&self, value: &Value) -> Result<Bytes, CodecError> {
        (self.encode_binary)(value)
    }

    pub(crate) fn from_binary(&self, data: &[u8]) -> Result<Value, CodecError> {
        (self.decode_binary)(data)
    }

    pub(crate) fn to_text(&self, value: &Value) -> Result<Bytes, CodecError> {
        (self.encode_text)(value)
    }

    pub(crate) fn from_text(&self, data: &[u8]) -> Result<Value, CodecError> {
        (self.decode_text)(data)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("binary_media_type", &self.binary_media_type)
            .field("allow_naive_streaming", &self.allow_naive_streaming)
            .finish_non_exhaustive()
    }
}

/// Builder for [`BridgeConfig`].
pub struct BridgeConfigBuilder {
    binary_media_type: String,
    allow_naive_streaming: bool,
    encode_binary: BinaryEncodeFn,
    decode_binary: BinaryDecodeFn,
    encode_text: TextEncodeFn,
    decode_text: TextDecodeFn,
}

impl BridgeConfigBuilder {
    fn new() -> Self {
        Self {
            binary_media_type: DEFAULT_BINARY_MEDIA_TYPE.to_string(),
            allow_naive_streaming: false,
            encode_binary: Arc::new(default_encode_binary),
            decode_binary: Arc::new(default_decode_binary),
            encode_text: Arc::new(default_encode_text),
            decode_text: Arc::new(default_decode_text),
        }
    }

    /// Overrides the binary media type, e.g. `application/x-msgpack`.
    pub fn binary_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.binary_media_type = media_type.into();
        self
    }

    /// Opts into buffering multi-chunk bodies before transcoding.
    ///
    /// This is not incremental streaming: the full body is still accumulated
    /// before decode, without any size limit.
    pub fn allow_naive_streaming(mut self, allow: bool) -> Self {
        self.allow_naive_streaming = allow;
        self
    }

    pub fn encode_binary<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Bytes, CodecError> + Send + Sync + 'static,
    {
        self.encode_binary = Arc::new(f);
        self
    }

    pub fn decode_binary<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        self.decode_binary = Arc::new(f);
        self
    }

    pub fn encode_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Bytes, CodecError> + Send + Sync + 'static,
    {
        self.encode_text = Arc::new(f);
        self
    }

    pub fn decode_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        self.decode_text = Arc::new(f);
        self
    }

    pub fn build(self) -> BridgeConfig {
        BridgeConfig {
            binary_media_type: self.binary_media_type,
            allow_naive_streaming: self.allow_naive_streaming,
            encode_binary: self.encode_binary,
            decode_binary: self.decode_binary,
            encode_text: self.encode_text,
            decode_text: self.decode_text,
        }
    }
}

impl fmt::Debug for BridgeConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfigBuilder")
            .field("binary_media_type", &self.binary_media_type)
            .field("allow_naive_streaming", &self.allow_naive_streaming)
            .finish_non_exhaustive()
    }
}
