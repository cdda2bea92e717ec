//! Transport-facing message stream traits.
//!
//! The transcoding layer is interposed at exactly two asynchronous
//! boundaries: pulling the next inbound message and pushing the next
//! outbound message. [`MessageSource`] and [`MessageSink`] abstract those
//! boundaries so the layer can wrap whatever the host transport provides.
//!
//! Backpressure is implicit in the pull-based model: the transcoder only
//! requests the next chunk after having processed the previous one, and only
//! forwards an outbound event after the previous one was accepted
//! downstream.
//!
//! Implementations for `futures` mpsc channel halves are provided; they back
//! the test suites and the demo example, standing in for a real connection
//! layer. A closed inbound channel is reported as [`Message::Disconnect`],
//! while a closed outbound channel surfaces as a broken-pipe io error.

use std::io;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};

use crate::protocol::{BridgeError, Message};

/// An asynchronous source of discrete inbound messages.
#[async_trait]
pub trait MessageSource: Send {
    /// Pulls the next message from the transport.
    async fn receive(&mut self) -> Result<Message, BridgeError>;
}

/// An asynchronous sink accepting discrete outbound messages.
#[async_trait]
pub trait MessageSink: Send {
    /// Pushes one message towards the transport.
    async fn send(&mut self, message: Message) -> Result<(), BridgeError>;
}

fn closed_sink_error(reason: mpsc::SendError) -> BridgeError {
    BridgeError::io(io::Error::new(io::ErrorKind::BrokenPipe, format!("message sink closed: {reason}")))
}

#[async_trait]
impl MessageSource for mpsc::Receiver<Message> {
    async fn receive(&mut self) -> Result<Message, BridgeError> {
        Ok(self.next().await.unwrap_or(Message::Disconnect))
    }
}

#[async_trait]
impl MessageSource for mpsc::UnboundedReceiver<Message> {
    async fn receive(&mut self) -> Result<Message, BridgeError> {
        Ok(self.next().await.unwrap_or(Message::Disconnect))
    }
}

#[async_trait]
impl MessageSink for mpsc::Sender<Message> {
    async fn send(&mut self, message: Message) -> Result<(), BridgeError> {
        SinkExt::send(self, message).await.map_err(closed_sink_error)
    }
}

#[async_trait]
impl MessageSink for mpsc::UnboundedSender<Message> {
    async fn send(&mut self, message: Message) -> Result<(), BridgeError> {
        SinkExt::send(self, message).await.map_err(closed_sink_error)
    }
}
