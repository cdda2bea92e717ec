use std::io;
use thiserror::Error;

/// Top-level error type for the transcoding layer.
///
/// Errors fall into three categories:
/// - usage errors ([`BridgeError::Unattached`]): incorrect wiring, fatal
/// - policy violations ([`BridgeError::StreamingUnsupported`]): surfaced to the
///   caller with actionable guidance, never retried
/// - data errors ([`BridgeError::Codec`]): malformed payloads, propagated
///   unchanged to whatever is consuming the body
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("streaming body not supported: {reason}")]
    StreamingUnsupported { reason: String },

    #[error("codec error: {source}")]
    Codec {
        #[from]
        source: CodecError,
    },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("message source/sink used before the transport attached it")]
    Unattached,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl BridgeError {
    pub fn streaming_unsupported<S: ToString>(str: S) -> Self {
        Self::StreamingUnsupported { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Error produced by the injected codec functions when a payload cannot be
/// decoded or re-encoded.
///
/// The bridge has no authority to repair malformed content, so these are
/// propagated as-is and never retried.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed msgpack payload: {reason}")]
    Msgpack { reason: String },

    #[error("malformed json payload: {reason}")]
    Json { reason: String },
}

impl CodecError {
    pub fn msgpack<S: ToString>(str: S) -> Self {
        Self::Msgpack { reason: str.to_string() }
    }

    pub fn json<S: ToString>(str: S) -> Self {
        Self::Json { reason: str.to_string() }
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Self::msgpack(e)
    }
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Self::msgpack(e)
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        Self::json(e)
    }
}
