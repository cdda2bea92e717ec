//! The middleware composing negotiation and the two transcoding wrappers.
//!
//! Per request, [`MsgpackMiddleware::call`] negotiates against the request
//! head, wraps the transport's source and sink, and runs the application
//! against the wrapped pair. Every request gets a fresh negotiation outcome
//! and fresh body buffers; nothing is shared across requests except the
//! immutable [`BridgeConfig`].

use std::sync::Arc;

use tracing::trace;

use crate::config::BridgeConfig;
use crate::handler::{AppResult, Application};
use crate::negotiate::Negotiation;
use crate::protocol::RequestHead;
use crate::transcode::{TranscodeSink, TranscodeSource};
use crate::transport::{MessageSink, MessageSource};

/// Wraps an [`Application`] so that it transparently serves and accepts
/// MessagePack while itself speaking only JSON.
#[derive(Debug)]
pub struct MsgpackMiddleware<A> {
    app: A,
    config: Arc<BridgeConfig>,
}

impl<A: Application> MsgpackMiddleware<A> {
    /// Wraps `app` with the default configuration.
    pub fn new(app: A) -> Self {
        Self::with_config(app, BridgeConfig::default())
    }

    /// Wraps `app` with an explicit configuration.
    pub fn with_config(app: A, config: BridgeConfig) -> Self {
        Self { app, config: Arc::new(config) }
    }

    /// Handles one request.
    ///
    /// `source` and `sink` are the transport's real message streams; the
    /// application only ever observes the transcoding wrappers substituted
    /// in front of them.
    pub async fn call<R, W>(&self, head: &mut RequestHead, source: R, sink: W) -> AppResult
    where
        R: MessageSource,
        W: MessageSink,
    {
        let negotiation = Negotiation::negotiate(head.headers_mut(), &self.config);
        trace!(method = %head.method(), uri = %head.uri(), "bridging request");

        let mut source_wrapper = TranscodeSource::new(Arc::clone(&self.config), negotiation);
        source_wrapper.attach(source);
        let mut sink_wrapper = TranscodeSink::new(Arc::clone(&self.config), negotiation);
        sink_wrapper.attach(sink);

        self.app.call(head, &mut source_wrapper, &mut sink_wrapper).await
    }

    /// The configuration this middleware operates under.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}
