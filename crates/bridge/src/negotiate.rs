//! Content negotiation.
//!
//! Decides, once per request, which transcoding directions apply:
//!
//! - the inbound body is decoded when the configured binary media type occurs
//!   in the request `content-type`
//! - the outbound body is encoded when the client lists the binary media type
//!   in its `accept` header
//!
//! The `content-type` test is a plain substring match, not a structured
//! media-type parse. This mirrors lenient real-world matching and is kept on
//! purpose, including its known looseness: an unrelated media type that
//! happens to contain the configured string also matches. The `accept` test
//! is an exact membership test over the comma-separated list instead.

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::config::BridgeConfig;

/// Per-request negotiation outcome.
///
/// Immutable after creation except for one allowed downgrade:
/// [`Negotiation::clear_encode_response`], taken when the application's
/// declared response content-type turns out not to be JSON.
#[derive(Debug, Clone, Copy)]
pub struct Negotiation {
    decode_request: bool,
    encode_response: bool,
}

impl Negotiation {
    /// Inspects the request headers and decides both directions.
    ///
    /// Side effect: when the inbound body will be decoded, the request
    /// `content-type` is rewritten to `application/json` so that downstream
    /// validation sees a type consistent with the body it receives.
    pub fn negotiate(headers: &mut HeaderMap, config: &BridgeConfig) -> Self {
        let media_type = config.binary_media_type();

        let decode_request = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.contains(media_type));

        // Take an initial guess; the outbound path may still find out the
        // application is not producing convertible content.
        let encode_response = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|accept| accept.split(','))
            .any(|candidate| candidate.trim() == media_type);

        if decode_request {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        debug!(decode_request, encode_response, "negotiated transcoding directions");
        Negotiation { decode_request, encode_response }
    }

    /// True if the inbound body must be decoded from the binary format.
    #[inline]
    pub fn decode_request(&self) -> bool {
        self.decode_request
    }

    /// True if the outbound body should be encoded into the binary format.
    #[inline]
    pub fn encode_response(&self) -> bool {
        self.encode_response
    }

    /// The one allowed downgrade: permanently stop encoding the response.
    pub(crate) fn clear_encode_response(&mut self) {
        self.encode_response = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negotiate(headers: &mut HeaderMap) -> Negotiation {
        Negotiation::negotiate(headers, &BridgeConfig::default())
    }

    #[test]
    fn no_headers_means_passthrough() {
        let mut headers = HeaderMap::new();
        let negotiation = negotiate(&mut headers);

        assert!(!negotiation.decode_request());
        assert!(!negotiation.encode_response());
    }

    #[test]
    fn msgpack_content_type_enables_decode_and_rewrites_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.msgpack"));

        let negotiation = negotiate(&mut headers);

        assert!(negotiation.decode_request());
        assert_eq!(headers.get(CONTENT_TYPE), Some(&HeaderValue::from_static("application/json")));
    }

    #[test]
    fn content_type_match_is_substring_based() {
        // known looseness: unrelated types containing the configured string
        // also match, kept for compatibility with lenient clients
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.msgpack; charset=binary"));
        assert!(negotiate(&mut headers).decode_request());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.msgpack-unrelated"));
        assert!(negotiate(&mut headers).decode_request());
    }

    #[test]
    fn json_content_type_is_left_alone() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let negotiation = negotiate(&mut headers);

        assert!(!negotiation.decode_request());
        assert_eq!(headers.get(CONTENT_TYPE), Some(&HeaderValue::from_static("application/json")));
    }

    #[test]
    fn accept_membership_is_exact() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html, application/vnd.msgpack"));
        assert!(negotiate(&mut headers).encode_response());

        // unlike content-type, accept values do not match by substring
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.msgpack;q=0.9"));
        assert!(!negotiate(&mut headers).encode_response());
    }

    #[test]
    fn accept_membership_spans_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append(ACCEPT, HeaderValue::from_static("text/html"));
        headers.append(ACCEPT, HeaderValue::from_static("application/vnd.msgpack"));
        assert!(negotiate(&mut headers).encode_response());
    }

    #[test]
    fn configured_media_type_is_respected() {
        let config = BridgeConfig::builder().binary_media_type("application/x-msgpack").build();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-msgpack"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/x-msgpack"));

        let negotiation = Negotiation::negotiate(&mut headers, &config);
        assert!(negotiation.decode_request());
        assert!(negotiation.encode_response());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.msgpack"));
        assert!(!Negotiation::negotiate(&mut headers, &config).decode_request());
    }
}
