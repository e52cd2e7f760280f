use std::sync::Arc;

use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::errors::{FrameError, SessionError};
use crate::application::messaging::{FrameReader, Session};
use crate::domain::entities::{ConnectionId, Outbound};
use crate::domain::traits::MessageSink;

use super::workplace::WorkplaceHandle;

/// Service for one client connection: read a frame, dispatch it, answer it
pub struct ConnectionService<R> {
    frames: FrameReader<R>,
    session: Session,
    sink: Arc<dyn MessageSink>,
    workplace: WorkplaceHandle,
}

impl<R: AsyncBufRead + Unpin> ConnectionService<R> {
    pub fn new(
        connection: ConnectionId,
        reader: R,
        sink: Arc<dyn MessageSink>,
        workplace: WorkplaceHandle,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            frames: FrameReader::new(reader, max_body_bytes),
            session: Session::new(connection, Arc::clone(&sink)),
            sink,
            workplace,
        }
    }

    /// Serve frames until the peer goes away, a read fails, or shutdown.
    ///
    /// Every frame gets exactly one `OK` or `ERR` reply, decided by local
    /// validation. `OK` is queued before the command is submitted, so it
    /// always precedes whatever the workplace writes back for that frame.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let connection = self.session.connection();
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => None,
                next = self.frames.next_request() => Some(next),
            };
            let Some(next) = next else {
                self.reply(&Outbound::err("server is shutting down"));
                info!("[{}] closing: shutdown requested", connection);
                break;
            };

            let reply = match next {
                Ok(Some(request)) => {
                    debug!("[{}] {}", connection, request.kind());
                    match self.session.dispatch(request) {
                        Ok(command) => {
                            if !self.reply(&Outbound::Ok) {
                                info!("[{}] closing: connection can no longer be written", connection);
                                break;
                            }
                            if self.workplace.submit(command).is_err() {
                                warn!("[{}] closing: workplace is gone", connection);
                                break;
                            }
                            continue;
                        }
                        Err(e) => self.rejected(e),
                    }
                }
                Ok(None) => {
                    info!("[{}] closed by peer", connection);
                    break;
                }
                Err(FrameError::Protocol(e)) => self.rejected(SessionError::Protocol(e)),
                Err(FrameError::Io(e)) => {
                    warn!("[{}] read failed: {}", connection, e);
                    break;
                }
            };

            if !self.reply(&reply) {
                info!("[{}] closing: connection can no longer be written", connection);
                break;
            }
        }

        if let Some(name) = self.session.identity() {
            // Leaving does not unregister; only DELETE does
            debug!("[{}] {} stays registered", connection, name);
        }
    }

    fn rejected(&self, error: SessionError) -> Outbound {
        warn!("[{}] {}", self.session.connection(), error);
        Outbound::err(error.to_string())
    }

    fn reply(&self, message: &Outbound) -> bool {
        self.sink.send(message.encode()).is_ok()
    }
}
