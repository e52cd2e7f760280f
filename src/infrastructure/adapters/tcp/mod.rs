//! TCP adapter

use async_trait::async_trait;
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::application::errors::ServerError;
use crate::domain::traits::{Acceptor, Connection};

/// Accepts clients on a TCP listener
pub struct TcpAcceptor {
    listener: TcpListener,
}

impl TcpAcceptor {
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }
}

#[async_trait]
impl Acceptor for TcpAcceptor {
    async fn accept(&self) -> Result<Connection, ServerError> {
        let (stream, peer) = self.listener.accept().await?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
        }
        let (reader, writer) = stream.into_split();
        Ok(Connection::new(peer.to_string(), reader, writer))
    }

    fn local_addr(&self) -> Result<String, ServerError> {
        Ok(self.listener.local_addr()?.to_string())
    }
}
