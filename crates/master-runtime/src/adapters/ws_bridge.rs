//! # WebSocket Stream Bridge
//!
//! Adapts an upgraded WebSocket into the transport-neutral stream halves the
//! services consume. Every binary frame carries one bincode `StreamMessage`.
//!
//! ```text
//! socket ──frame──► reader task ──► ChannelSource ──► service loop
//! socket ◄─frame─── writer task ◄── ChannelSink   ◄── service / registry
//! ```
//!
//! The two directions run as separate tasks: a reader parked on a full
//! source queue never stops the writer from draining the sink queue.
//!
//! A close frame or end of socket ends the source with EOF and stops the
//! writer, which closes the sink; that is what `Subscribe` observes as
//! cancellation. Oversized and undecodable frames are dropped; the stream
//! stays up.

use std::fmt::Display;

use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use shared_bus::{channel_stream, PeerStream, ServerStream, StreamError};
use shared_types::StreamMessage;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Why an inbound frame was dropped.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame of {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("undecodable frame: {0}")]
    Malformed(#[from] shared_types::CodecError),
}

/// Decode one inbound frame.
pub fn decode_frame(bytes: &[u8], limit: usize) -> Result<StreamMessage, FrameError> {
    if bytes.len() > limit {
        return Err(FrameError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }
    Ok(StreamMessage::from_bytes(bytes)?)
}

/// Spawn the pump for `socket` and return the server-side halves.
pub fn bridge(socket: WebSocket, route: &'static str, buffer: usize, max_frame_bytes: usize) -> ServerStream {
    let (server, peer) = channel_stream(buffer);
    let (ws_tx, ws_rx) = socket.split();
    spawn_pump(ws_tx, ws_rx, peer, route, max_frame_bytes);
    server
}

/// Spawn the reader and writer tasks over the two socket halves.
pub(crate) fn spawn_pump<W, R, E>(
    ws_tx: W,
    ws_rx: R,
    peer: PeerStream,
    route: &'static str,
    max_frame_bytes: usize,
) -> (JoinHandle<()>, JoinHandle<()>)
where
    W: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let conn = Uuid::new_v4();
    let PeerStream { outbound, inbound } = peer;
    // Dropped by the reader on exit; the writer treats that as "socket gone".
    let (reader_done, reader_gone) = oneshot::channel::<()>();
    debug!(%conn, route, "stream opened");

    let reader = tokio::spawn(read_frames(ws_rx, outbound, reader_done, conn, route, max_frame_bytes));
    let writer = tokio::spawn(write_frames(ws_tx, inbound, reader_gone, conn, route));
    (reader, writer)
}

async fn read_frames<R, E>(
    mut ws_rx: R,
    outbound: mpsc::Sender<Result<StreamMessage, StreamError>>,
    _done: oneshot::Sender<()>,
    conn: Uuid,
    route: &'static str,
    max_frame_bytes: usize,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        match ws_rx.next().await {
            Some(Ok(Message::Binary(bytes))) => match decode_frame(&bytes, max_frame_bytes) {
                Ok(msg) => {
                    if outbound.send(Ok(msg)).await.is_err() {
                        // Handler stopped reading; keep consuming until close.
                        debug!(%conn, route, "source dropped, discarding frame");
                    }
                }
                Err(e) => warn!(%conn, route, error = %e, "frame dropped"),
            },
            Some(Ok(Message::Close(_))) | None => {
                debug!(%conn, route, "peer closed stream");
                return;
            }
            Some(Ok(Message::Text(_))) => warn!(%conn, route, "text frame dropped"),
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                let _ = outbound.send(Err(StreamError::Transport(e.to_string()))).await;
                return;
            }
        }
    }
}

async fn write_frames<W>(
    mut ws_tx: W,
    mut inbound: mpsc::Receiver<StreamMessage>,
    mut reader_gone: oneshot::Receiver<()>,
    conn: Uuid,
    route: &'static str,
) where
    W: Sink<Message> + Unpin,
{
    loop {
        tokio::select! {
            msg = inbound.recv() => match msg {
                Some(msg) => {
                    let bytes = match msg.to_bytes() {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            error!(%conn, route, error = %e, "failed to encode outbound envelope");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Binary(bytes)).await.is_err() {
                        debug!(%conn, route, "write failed, closing stream");
                        return;
                    }
                }
                None => {
                    // Every sink handle is gone: the server side is done.
                    let _ = ws_tx.send(Message::Close(None)).await;
                    return;
                }
            },
            _ = &mut reader_gone => {
                debug!(%conn, route, "reader finished, closing sink");
                return;
            }
        }
    }
}
