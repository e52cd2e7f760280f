//! Domain entities - Registry records and the commands that mutate them

pub mod channel;
pub mod command;
pub mod member;
pub mod message;
pub mod name;

pub use channel::Channel;
pub use command::Command;
pub use member::{ConnectionId, Member};
pub use message::Outbound;
pub use name::{ChannelName, Username};
