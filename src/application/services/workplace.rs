//! Workplace - the single owner of the member and channel directories.
//!
//! Connections never touch the directories. They hold a [`WorkplaceHandle`]
//! and submit [`Command`]s into one unbounded queue; [`Workplace::run`]
//! drains that queue and applies each command to completion before taking
//! the next, which totally orders every registry mutation.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::entities::{Channel, ChannelName, Command, Member, Outbound, Username};

/// Cloneable submission side of the workplace queue
#[derive(Clone)]
pub struct WorkplaceHandle {
    sender: mpsc::UnboundedSender<Command>,
}

impl WorkplaceHandle {
    /// Queue a command. Fails only once the workplace loop has stopped.
    pub fn submit(&self, command: Command) -> Result<(), mpsc::error::SendError<Command>> {
        self.sender.send(command)
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Registry actor state
pub struct Workplace {
    members: HashMap<Username, Member>,
    channels: HashMap<ChannelName, Channel>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Workplace {
    pub fn new() -> (Self, WorkplaceHandle) {
        let (sender, commands) = mpsc::unbounded_channel();
        let workplace = Self {
            members: HashMap::new(),
            channels: HashMap::new(),
            commands,
        };
        (workplace, WorkplaceHandle { sender })
    }

    /// Consume commands until cancelled or until every handle is dropped
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Workplace started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Workplace stopping: shutdown requested");
                    break;
                }
                next = self.commands.recv() => match next {
                    Some(command) => self.apply(command),
                    None => {
                        info!("Workplace stopping: no connections can submit anymore");
                        break;
                    }
                },
            }
        }
        self.commands.close();
        info!(
            "Workplace stopped with {} members in {} channels",
            self.member_count(),
            self.channels.len()
        );
    }

    /// Apply one command to completion
    pub fn apply(&mut self, command: Command) {
        let issuer = command.issuer();
        debug!("[{}] {} from {}", issuer.connection, command.kind(), issuer.name);

        match command {
            Command::Register { target } => self.register(target),
            Command::Delete { target } => self.delete(target),
            Command::Join { member, channel } => self.join(member, channel),
            Command::Leave { member, channel } => self.leave(member, channel),
            Command::ListChannels { requester } => self.list_channels(&requester),
            Command::ListMembers { requester } => self.list_members(&requester),
            Command::SendChannelMessage {
                sender,
                channel,
                body,
            } => self.send_in_channel(&sender, &channel, body),
            Command::SendDirectMessage {
                sender,
                recipient,
                body,
            } => self.send_direct(&sender, &recipient, body),
        }
    }

    fn register(&mut self, member: Member) {
        if self.members.contains_key(&member.name) {
            warn!("[{}] {} is already taken", member.connection, member.name);
            self.notify(&member, format!("{} username is already taken", member.name));
            return;
        }

        info!("[{}] registered {}", member.connection, member.name);
        self.members.insert(member.name.clone(), member);
    }

    fn delete(&mut self, member: Member) {
        if !self.ensure_registered(&member) {
            return;
        }

        self.members.remove(&member.name);
        for channel in self.channels.values_mut() {
            channel.leave(&member.name);
        }
        info!("[{}] deleted {}", member.connection, member.name);
    }

    fn join(&mut self, member: Member, name: ChannelName) {
        if !self.ensure_registered(&member) {
            return;
        }

        let channel = self.channels.entry(name.clone()).or_insert_with(|| {
            info!("Created channel {}", name);
            Channel::new(name)
        });
        let (who, connection) = (member.name.clone(), member.connection);
        if channel.join(member) {
            debug!("[{}] {} joined {} ({} members)", connection, who, channel.name, channel.len());
        }
    }

    fn leave(&mut self, member: Member, name: ChannelName) {
        if !self.ensure_registered(&member) {
            return;
        }

        if let Some(channel) = self.channels.get_mut(&name) {
            if channel.leave(&member.name) && channel.is_empty() {
                debug!("[{}] {} left {}, channel is now empty", member.connection, member.name, name);
            }
        }
    }

    fn list_channels(&self, requester: &Member) {
        for name in self.channels.keys() {
            self.send_or_log(requester, &Outbound::Listing(name.to_string()));
        }
    }

    fn list_members(&self, requester: &Member) {
        for name in self.members.keys() {
            self.send_or_log(requester, &Outbound::Listing(name.to_string()));
        }
    }

    // Unknown channels are dropped without telling the sender.
    fn send_in_channel(&self, sender: &Member, name: &ChannelName, body: Bytes) {
        if !self.ensure_registered(sender) {
            return;
        }

        let Some(channel) = self.channels.get(name) else {
            debug!("[{}] dropped message to unknown channel {}", sender.connection, name);
            return;
        };
        let delivered = channel.broadcast(&sender.name, body);
        debug!("[{}] {} -> {} ({} delivered)", sender.connection, sender.name, name, delivered);
    }

    // Unknown recipients are dropped without telling the sender.
    fn send_direct(&self, sender: &Member, recipient: &Username, body: Bytes) {
        if !self.ensure_registered(sender) {
            return;
        }

        let Some(to) = self.members.get(recipient) else {
            debug!("[{}] dropped message to unknown member {}", sender.connection, recipient);
            return;
        };
        self.send_or_log(to, &Outbound::chat(sender.name.as_str(), body));
    }

    /// True when `member`'s connection currently owns its username
    fn owns(&self, member: &Member) -> bool {
        self.member(&member.name)
            .is_some_and(|registered| registered.same_connection(member))
    }

    fn ensure_registered(&self, member: &Member) -> bool {
        if self.owns(member) {
            return true;
        }
        self.notify(member, format!("{} is not registered", member.name));
        false
    }

    fn notify(&self, member: &Member, message: String) {
        self.send_or_log(member, &Outbound::Err(message));
    }

    fn send_or_log(&self, member: &Member, message: &Outbound) {
        if let Err(e) = member.deliver(message) {
            debug!("[{}] dropped frame for {}: {}", member.connection, member.name, e);
        }
    }

    /// Take the next queued command without applying it
    #[cfg(test)]
    pub(crate) fn try_next(&mut self) -> Option<Command> {
        self.commands.try_recv().ok()
    }

    pub fn member(&self, name: &Username) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[cfg(test)]
    pub(crate) fn channel(&self, name: &ChannelName) -> Option<&Channel> {
        self.channels.get(name)
    }

    #[cfg(test)]
    pub(crate) fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }
}
