//! Adapters - Transport implementations

pub mod tcp;
pub mod writer;

pub use tcp::TcpAcceptor;
pub use writer::{spawn_writer, ConnectionSink};
