//! slck - a line-oriented chat server
//!
//! Clients connect over TCP, register an `@handle`, join `#channels` and
//! exchange channel broadcasts or direct messages. All shared state lives in
//! one [`Workplace`] task; each connection parses frames, validates them and
//! submits [`Command`]s to it.

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_helpers;

pub use application::services::{Workplace, WorkplaceHandle};
pub use domain::entities::Command;
pub use infrastructure::adapters::TcpAcceptor;
pub use infrastructure::config::Config;
pub use infrastructure::server::Server;
