use bytes::Bytes;

use super::member::Member;
use super::name::{ChannelName, Username};

/// A validated operation submitted by a connection to the workplace
#[derive(Debug, Clone)]
pub enum Command {
    Register { target: Member },
    Delete { target: Member },
    Join { member: Member, channel: ChannelName },
    Leave { member: Member, channel: ChannelName },
    ListChannels { requester: Member },
    ListMembers { requester: Member },
    SendChannelMessage {
        sender: Member,
        channel: ChannelName,
        body: Bytes,
    },
    SendDirectMessage {
        sender: Member,
        recipient: Username,
        body: Bytes,
    },
}

impl Command {
    /// Wire keyword of the request this command came from
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Register { .. } => "REGISTER",
            Command::Delete { .. } => "DELETE",
            Command::Join { .. } => "JOIN",
            Command::Leave { .. } => "LEAVE",
            Command::ListChannels { .. } => "CHANNELS",
            Command::ListMembers { .. } => "MEMBERS",
            Command::SendChannelMessage { .. } | Command::SendDirectMessage { .. } => "SEND",
        }
    }

    /// The member on whose behalf the command runs
    pub fn issuer(&self) -> &Member {
        match self {
            Command::Register { target } | Command::Delete { target } => target,
            Command::Join { member, .. } | Command::Leave { member, .. } => member,
            Command::ListChannels { requester } | Command::ListMembers { requester } => requester,
            Command::SendChannelMessage { sender, .. } | Command::SendDirectMessage { sender, .. } => {
                sender
            }
        }
    }
}
