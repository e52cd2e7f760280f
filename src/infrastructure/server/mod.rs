//! Server - accept loop wiring connections to the workplace

use tokio::io::BufReader;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::errors::ServerError;
use crate::application::services::{ConnectionService, Workplace, WorkplaceHandle};
use crate::domain::traits::{Acceptor, Connection};
use crate::infrastructure::adapters::spawn_writer;
use crate::infrastructure::config::Config;

/// Chat server: one workplace task plus one task per connection
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Serve clients from `acceptor` until `shutdown` is cancelled.
    ///
    /// Returns an error only when accepting fails; connection level
    /// failures end that connection alone.
    pub async fn run<A: Acceptor>(&self, acceptor: A, shutdown: CancellationToken) -> Result<(), ServerError> {
        let (mut workplace, handle) = Workplace::new();
        let workplace_shutdown = shutdown.clone();
        let workplace_task = tokio::spawn(async move { workplace.run(workplace_shutdown).await });

        let mut connections = JoinSet::new();
        let result = loop {
            tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                accepted = acceptor.accept() => match accepted {
                    Ok(connection) => self.spawn_connection(&mut connections, connection, handle.clone(), shutdown.clone()),
                    Err(e) => break Err(e),
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        debug!("Connection task ended abnormally: {}", e);
                    }
                }
            }
        };

        // Connection loops watch the same token, so this drains quickly
        shutdown.cancel();
        while connections.join_next().await.is_some() {}
        let _ = workplace_task.await;
        info!("Server stopped");
        result
    }

    fn spawn_connection(
        &self,
        connections: &mut JoinSet<()>,
        connection: Connection,
        workplace: WorkplaceHandle,
        shutdown: CancellationToken,
    ) {
        let max_body_bytes = self.config.protocol.max_body_bytes;
        connections.spawn(async move {
            let Connection {
                id,
                peer,
                reader,
                writer,
            } = connection;
            info!("[{}] accepted {}", id, peer);

            let (sink, writer_task) = spawn_writer(id, writer);
            let service = ConnectionService::new(id, BufReader::new(reader), sink.clone(), workplace, max_body_bytes);
            service.run(shutdown).await;

            sink.close();
            let _ = writer_task.await;
            info!("[{}] disconnected {}", id, peer);
        });
    }
}
