use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::application::errors::ServerError;
use crate::domain::entities::ConnectionId;

/// One accepted client, split into its read and write halves
pub struct Connection {
    pub id: ConnectionId,
    pub peer: String,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
}

impl Connection {
    pub fn new<R, W>(peer: impl Into<String>, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id: ConnectionId::new(),
            peer: peer.into(),
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }
}

/// Acceptor trait - abstraction for the listening transport
#[async_trait]
pub trait Acceptor: Send + Sync {
    /// Wait for the next client
    async fn accept(&self) -> Result<Connection, ServerError>;

    /// Human readable address clients connect to
    fn local_addr(&self) -> Result<String, ServerError>;
}
