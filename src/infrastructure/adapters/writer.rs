//! Connection writer - the single task allowed to write to a socket
//!
//! Replies from the connection loop and deliveries from the workplace both
//! go through [`ConnectionSink`], which only queues frames. One writer task
//! per connection drains the queue, so frames never interleave.

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::errors::SinkError;
use crate::domain::entities::ConnectionId;
use crate::domain::traits::MessageSink;

/// Queueing sink bound to one connection's writer task
pub struct ConnectionSink {
    frames: mpsc::UnboundedSender<Bytes>,
    closed: CancellationToken,
}

impl ConnectionSink {
    /// Refuse new frames. Frames already queued are still written before
    /// the socket is shut down.
    pub fn close(&self) {
        self.closed.cancel();
    }
}

impl MessageSink for ConnectionSink {
    fn send(&self, frame: Bytes) -> Result<(), SinkError> {
        if self.closed.is_cancelled() {
            return Err(SinkError::Closed);
        }
        self.frames.send(frame).map_err(|_| SinkError::Closed)
    }
}

/// Start the writer task for `writer`
pub fn spawn_writer<W>(connection: ConnectionId, writer: W) -> (std::sync::Arc<ConnectionSink>, JoinHandle<()>)
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (frames, queue) = mpsc::unbounded_channel();
    let closed = CancellationToken::new();
    let sink = std::sync::Arc::new(ConnectionSink {
        frames,
        closed: closed.clone(),
    });
    let task = tokio::spawn(write_frames(connection, writer, queue, closed));
    (sink, task)
}

async fn write_frames<W>(
    connection: ConnectionId,
    mut writer: W,
    mut queue: mpsc::UnboundedReceiver<Bytes>,
    closed: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let frame = tokio::select! {
            biased;
            frame = queue.recv() => frame,
            _ = closed.cancelled() => queue.try_recv().ok(),
        };
        let Some(frame) = frame else {
            break;
        };
        if let Err(e) = write_frame(&mut writer, &frame).await {
            warn!("[{}] write failed: {}", connection, e);
            queue.close();
            return;
        }
    }

    queue.close();
    if let Err(e) = writer.shutdown().await {
        debug!("[{}] shutdown failed: {}", connection, e);
    }
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &[u8]) -> std::io::Result<()> {
    writer.write_all(frame).await?;
    writer.flush().await
}
