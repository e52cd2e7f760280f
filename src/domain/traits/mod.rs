//! Domain traits - Abstractions for infrastructure implementations

pub mod acceptor;
pub mod sink;

pub use acceptor::{Acceptor, Connection};
pub use sink::MessageSink;
