//! Application services - The registry actor and the per-connection loop

pub mod connection_service;
pub mod workplace;

pub use connection_service::ConnectionService;
pub use workplace::{Workplace, WorkplaceHandle};
