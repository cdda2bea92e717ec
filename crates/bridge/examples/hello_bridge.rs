//! Drives one negotiated request through the bridge over channel transports
//! and prints what the client side would see.
//!
//! ```shell
//! cargo run --example hello_bridge
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::channel::mpsc;
use http::{HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::json;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use msgpack_bridge::{
    AppResult, Application, Message, MessageSink, MessageSource, MsgpackMiddleware, RequestHead,
};

/// Reads the request as JSON and answers with a JSON greeting.
struct HelloApp;

#[async_trait]
impl Application for HelloApp {
    async fn call(&self, head: &mut RequestHead, source: &mut dyn MessageSource, sink: &mut dyn MessageSink) -> AppResult {
        let mut body = Vec::new();
        loop {
            match source.receive().await? {
                Message::RequestBody { body: chunk, more_body } => {
                    body.extend_from_slice(&chunk);
                    if !more_body {
                        break;
                    }
                }
                _ => break,
            }
        }

        let request: serde_json::Value = serde_json::from_slice(&body)?;
        info!(content_type = ?head.headers().get(http::header::CONTENT_TYPE), body = %request, "application observes json");

        let response = serde_json::to_vec(&json!({"echo": request["message"]}))?;
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from(response.len()));
        sink.send(Message::response_headers(StatusCode::OK, headers)).await?;
        sink.send(Message::response_body(Bytes::from(response), false)).await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let middleware = MsgpackMiddleware::new(HelloApp);

    // a client speaking msgpack in both directions
    let mut head: RequestHead = Request::builder()
        .method(http::Method::POST)
        .uri("/")
        .header(http::header::CONTENT_TYPE, "application/vnd.msgpack")
        .header(http::header::ACCEPT, "application/vnd.msgpack")
        .body(())?
        .into();

    let packed = rmp_serde::to_vec(&json!({"message": "Hello, world!"}))?;
    let (req_tx, req_rx) = mpsc::unbounded();
    req_tx.unbounded_send(Message::request_body(Bytes::from(packed), false))?;
    drop(req_tx);

    let (resp_tx, mut resp_rx) = mpsc::unbounded();
    middleware.call(&mut head, req_rx, resp_tx).await?;

    while let Some(message) = resp_rx.next().await {
        match message {
            Message::ResponseHeaders { status, headers } => info!(%status, ?headers, "client receives headers"),
            Message::ResponseBody { body, .. } => {
                let value: serde_json::Value = rmp_serde::from_slice(&body)?;
                info!(%value, len = body.len(), "client receives msgpack body");
            }
            other => info!(?other, "client receives"),
        }
    }
    Ok(())
}
