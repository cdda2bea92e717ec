use std::error::Error;

use async_trait::async_trait;

use crate::protocol::RequestHead;
use crate::transport::{MessageSink, MessageSource};

/// Result type returned by applications driven through the bridge.
pub type AppResult = Result<(), Box<dyn Error + Send + Sync>>;

/// The application the bridge wraps.
///
/// An application is driven once per request: it pulls body chunks from the
/// source, runs its logic, and pushes exactly one response headers event
/// followed by the response body into the sink. The bridge substitutes its
/// own source and sink, so the application stays oblivious to the wire
/// format the client actually spoke.
#[async_trait]
pub trait Application: Send + Sync {
    async fn call(&self, head: &mut RequestHead, source: &mut dyn MessageSource, sink: &mut dyn MessageSink) -> AppResult;
}
