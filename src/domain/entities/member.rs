use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use super::message::Outbound;
use super::name::Username;
use crate::application::errors::SinkError;
use crate::domain::traits::MessageSink;

/// Identifies one accepted connection for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered (or registering) participant, bound to one connection's sink
#[derive(Clone)]
pub struct Member {
    pub name: Username,
    pub connection: ConnectionId,
    sink: Arc<dyn MessageSink>,
}

impl Member {
    pub fn new(name: Username, connection: ConnectionId, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            name,
            connection,
            sink,
        }
    }

    /// Whether both values speak for the same connection
    pub fn same_connection(&self, other: &Member) -> bool {
        self.connection == other.connection
    }

    pub fn deliver(&self, message: &Outbound) -> Result<(), SinkError> {
        self.sink.send(message.encode())
    }

    /// Write an already encoded frame, used when fanning one frame out
    pub fn deliver_frame(&self, frame: Bytes) -> Result<(), SinkError> {
        self.sink.send(frame)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
