//! # Stream Handles
//!
//! Transport-neutral halves of a long-lived stream. The transport adapts its
//! socket into a [`StreamSource`] (inbound envelopes) and a [`StreamSink`]
//! (outbound envelopes); the services never see the socket.
//!
//! `channel_stream` builds an in-memory pair used by the WebSocket adapter
//! and by the tests.

use async_trait::async_trait;
use shared_types::StreamMessage;
use thiserror::Error;
use tokio::sync::mpsc;

/// Receive/send failures on a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The peer is gone.
    #[error("Stream closed")]
    Closed,

    /// The call was cancelled by the transport.
    #[error("Stream cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Frame decode error: {0}")]
    Codec(String),
}

impl StreamError {
    /// Cancellation-flavored errors end a stream normally.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

/// Outbound half. Shared between the owning handler and the registry.
#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn send(&self, msg: StreamMessage) -> Result<(), StreamError>;

    /// Resolves once the peer can no longer receive.
    async fn closed(&self);

    fn is_closed(&self) -> bool;
}

/// Inbound half. Owned by the handler loop.
#[async_trait]
pub trait StreamSource: Send {
    /// Next envelope, `Ok(None)` on clean end-of-stream.
    async fn recv(&mut self) -> Result<Option<StreamMessage>, StreamError>;
}

// =============================================================================
// CHANNEL-BACKED HANDLES
// =============================================================================

pub struct ChannelSink {
    tx: mpsc::Sender<StreamMessage>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: mpsc::Sender<StreamMessage>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl StreamSink for ChannelSink {
    async fn send(&self, msg: StreamMessage) -> Result<(), StreamError> {
        self.tx.send(msg).await.map_err(|_| StreamError::Closed)
    }

    async fn closed(&self) {
        self.tx.closed().await;
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct ChannelSource {
    rx: mpsc::Receiver<Result<StreamMessage, StreamError>>,
}

impl ChannelSource {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<Result<StreamMessage, StreamError>>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl StreamSource for ChannelSource {
    async fn recv(&mut self) -> Result<Option<StreamMessage>, StreamError> {
        match self.rx.recv().await {
            Some(Ok(msg)) => Ok(Some(msg)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

/// Server side of an in-memory stream.
pub struct ServerStream {
    pub source: ChannelSource,
    pub sink: ChannelSink,
}

/// Remote side of an in-memory stream.
///
/// Dropping `outbound` ends the server's source with EOF; dropping `inbound`
/// closes the server's sink.
pub struct PeerStream {
    pub outbound: mpsc::Sender<Result<StreamMessage, StreamError>>,
    pub inbound: mpsc::Receiver<StreamMessage>,
}

impl PeerStream {
    pub async fn send(&self, msg: StreamMessage) -> Result<(), StreamError> {
        self.outbound
            .send(Ok(msg))
            .await
            .map_err(|_| StreamError::Closed)
    }

    /// Inject a receive error into the server's source.
    pub async fn fail(&self, err: StreamError) -> Result<(), StreamError> {
        self.outbound
            .send(Err(err))
            .await
            .map_err(|_| StreamError::Closed)
    }

    pub async fn recv(&mut self) -> Option<StreamMessage> {
        self.inbound.recv().await
    }
}

/// Create a connected server/peer pair with `buffer` slots in each direction.
#[must_use]
pub fn channel_stream(buffer: usize) -> (ServerStream, PeerStream) {
    let (in_tx, in_rx) = mpsc::channel(buffer);
    let (out_tx, out_rx) = mpsc::channel(buffer);
    (
        ServerStream {
            source: ChannelSource::new(in_rx),
            sink: ChannelSink::new(out_tx),
        },
        PeerStream {
            outbound: in_tx,
            inbound: out_rx,
        },
    )
}
