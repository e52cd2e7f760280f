use std::collections::HashMap;

use bytes::Bytes;

use super::member::Member;
use super::message::Outbound;
use super::name::{ChannelName, Username};

/// A named group. Channels outlive their members: an empty channel stays.
#[derive(Debug)]
pub struct Channel {
    pub name: ChannelName,
    members: HashMap<Username, Member>,
}

impl Channel {
    pub fn new(name: ChannelName) -> Self {
        Self {
            name,
            members: HashMap::new(),
        }
    }

    /// Add a member. Joining twice keeps the first entry.
    pub fn join(&mut self, member: Member) -> bool {
        if self.members.contains_key(&member.name) {
            return false;
        }
        self.members.insert(member.name.clone(), member);
        true
    }

    /// Remove a member, a no-op for non-members
    pub fn leave(&mut self, name: &Username) -> bool {
        self.members.remove(name).is_some()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, name: &Username) -> bool {
        self.members.contains_key(name)
    }

    #[cfg(test)]
    pub(crate) fn member_names(&self) -> impl Iterator<Item = &Username> {
        self.members.keys()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Send `<sender>: <body>` to every member, the sender included.
    /// A dead sink does not stop delivery to the rest. Returns how many
    /// members accepted the frame.
    pub fn broadcast(&self, sender: &Username, body: Bytes) -> usize {
        let frame = Outbound::chat(sender.as_str(), body).encode();
        let mut delivered = 0;
        for member in self.members.values() {
            match member.deliver_frame(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!("[{}] dropped broadcast to {}: {}", self.name, member.name, e);
                }
            }
        }
        delivered
    }
}
