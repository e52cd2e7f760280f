//! Application layer - Protocol handling and the shared registry
//!
//! This layer contains:
//! - Errors: Protocol, validation, session, sink, server and config errors
//! - Messaging: Frame parsing and per-connection session dispatch
//! - Services: The workplace actor and the connection loop

pub mod errors;
pub mod messaging;
pub mod services;
