//! Domain layer - Chat registry model and the seams to its transport
//!
//! This layer contains:
//! - Entities: Usernames, channel names, members, channels, commands, outbound frames
//! - Traits: The write capability a member carries (MessageSink) and the
//!   transport that hands out connections (Acceptor)

pub mod entities;
pub mod traits;
