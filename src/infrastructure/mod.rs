//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: The TCP transport and the per-connection writer
//! - Server: The accept loop tying connections to the workplace

pub mod adapters;
pub mod config;
pub mod server;
