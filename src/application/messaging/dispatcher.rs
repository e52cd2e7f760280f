//! Session dispatcher - Turns parsed requests into workplace commands
//!
//! A session starts unregistered. REGISTER binds a username locally; DELETE
//! unbinds it. Every other request needs a bound username and is refused
//! locally without one.

use std::sync::Arc;

use crate::application::errors::SessionError;
use crate::domain::entities::{ChannelName, Command, ConnectionId, Member, Username};
use crate::domain::traits::MessageSink;

use super::parser::Request;

/// Per-connection protocol state
pub struct Session {
    connection: ConnectionId,
    sink: Arc<dyn MessageSink>,
    identity: Option<Username>,
}

impl Session {
    pub fn new(connection: ConnectionId, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            connection,
            sink,
            identity: None,
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn identity(&self) -> Option<&Username> {
        self.identity.as_ref()
    }

    /// Validate `request` and build the command to submit.
    ///
    /// A second REGISTER simply rebinds; whether the name is free is only
    /// known once the workplace applies the command.
    pub fn dispatch(&mut self, request: Request) -> Result<Command, SessionError> {
        let command = match request {
            Request::Register { name } => {
                let name = Username::parse(name).map_err(|source| SessionError::Validation {
                    action: "register",
                    source,
                })?;
                self.identity = Some(name.clone());
                Command::Register {
                    target: self.member_named(name),
                }
            }
            Request::Delete => {
                let target = self.member("delete")?;
                self.identity = None;
                Command::Delete { target }
            }
            Request::Join { channel } => Command::Join {
                member: self.member("join")?,
                channel: parse_channel("join", channel)?,
            },
            Request::Leave { channel } => Command::Leave {
                member: self.member("leave")?,
                channel: parse_channel("leave", channel)?,
            },
            Request::Channels => Command::ListChannels {
                requester: self.member("list channels")?,
            },
            Request::Members => Command::ListMembers {
                requester: self.member("list members")?,
            },
            Request::Send { target, body } => {
                let action = "send message";
                let sender = self.member(action)?;
                match target.chars().next() {
                    Some(ChannelName::SIGIL) => Command::SendChannelMessage {
                        sender,
                        channel: parse_channel(action, target)?,
                        body,
                    },
                    Some(Username::SIGIL) => Command::SendDirectMessage {
                        sender,
                        recipient: Username::parse(target)
                            .map_err(|source| SessionError::Validation { action, source })?,
                        body,
                    },
                    _ => return Err(SessionError::InvalidTarget(target)),
                }
            }
        };
        Ok(command)
    }

    fn member(&self, action: &'static str) -> Result<Member, SessionError> {
        let name = self
            .identity
            .clone()
            .ok_or(SessionError::NoSession { action })?;
        Ok(self.member_named(name))
    }

    fn member_named(&self, name: Username) -> Member {
        Member::new(name, self.connection, Arc::clone(&self.sink))
    }
}

fn parse_channel(action: &'static str, raw: String) -> Result<ChannelName, SessionError> {
    ChannelName::parse(raw).map_err(|source| SessionError::Validation { action, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingSink;
    use bytes::Bytes;

    fn session() -> Session {
        Session::new(ConnectionId::new(), Arc::new(RecordingSink::new()))
    }

    fn register(session: &mut Session, name: &str) -> Command {
        session
            .dispatch(Request::Register { name: name.into() })
            .unwrap()
    }

    fn send(target: &str) -> Request {
        Request::Send {
            target: target.into(),
            body: Bytes::from_static(b"hi"),
        }
    }

    #[test]
    fn test_commands_before_register_fail_with_no_session() {
        let mut session = session();

        for request in [
            Request::Delete,
            Request::Join { channel: "#general".into() },
            Request::Leave { channel: "#general".into() },
            Request::Channels,
            Request::Members,
            send("@bob"),
            send("nobody"),
        ] {
            let err = session.dispatch(request).unwrap_err();
            assert!(matches!(err, SessionError::NoSession { .. }), "{}", err);
        }
    }

    #[test]
    fn test_register_binds_identity() {
        let mut session = session();

        let command = register(&mut session, "@alice");

        assert_eq!(session.identity().map(Username::as_str), Some("@alice"));
        let Command::Register { target } = command else {
            panic!("expected Register, got {:?}", command);
        };
        assert_eq!(target.name.as_str(), "@alice");
        assert_eq!(target.connection, session.connection());
    }

    #[test]
    fn test_invalid_username_is_rejected_locally() {
        let mut session = session();

        let err = session
            .dispatch(Request::Register { name: "alice".into() })
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to register: username does not start with @");
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_reregister_rebinds_identity() {
        let mut session = session();
        register(&mut session, "@alice");
        register(&mut session, "@bob");

        assert_eq!(session.identity().map(Username::as_str), Some("@bob"));
        let Command::Join { member, .. } = session
            .dispatch(Request::Join { channel: "#general".into() })
            .unwrap()
        else {
            panic!("expected Join");
        };
        assert_eq!(member.name.as_str(), "@bob");
    }

    #[test]
    fn test_delete_clears_identity() {
        let mut session = session();
        register(&mut session, "@alice");

        let command = session.dispatch(Request::Delete).unwrap();

        assert!(matches!(command, Command::Delete { ref target } if target.name.as_str() == "@alice"));
        assert!(session.identity().is_none());
        assert!(matches!(
            session.dispatch(Request::Members),
            Err(SessionError::NoSession { .. })
        ));
    }

    #[test]
    fn test_send_dispatches_on_target_sigil() {
        let mut session = session();
        register(&mut session, "@alice");

        assert!(matches!(
            session.dispatch(send("#general")).unwrap(),
            Command::SendChannelMessage { ref channel, .. } if channel.as_str() == "#general"
        ));
        assert!(matches!(
            session.dispatch(send("@bob")).unwrap(),
            Command::SendDirectMessage { ref recipient, .. } if recipient.as_str() == "@bob"
        ));

        let err = session.dispatch(send("bob")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTarget(ref t) if t == "bob"));

        let err = session.dispatch(send("#")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to send message: channel name excluding # is empty"
        );
    }

    #[test]
    fn test_invalid_channel_name_is_rejected() {
        let mut session = session();
        register(&mut session, "@alice");

        let err = session
            .dispatch(Request::Join { channel: "general".into() })
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to join: channel name does not start with #");

        let err = session
            .dispatch(Request::Leave { channel: String::new() })
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to leave: channel name is empty");
    }
}
