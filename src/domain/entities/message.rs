use bytes::{BufMut, Bytes, BytesMut};

/// Prefix of every error line
pub const ERR: &str = "ERR";

/// Everything the server ever writes to a client, one variant per frame shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// `OK\n`
    Ok,
    /// `ERR <message>\n`
    Err(String),
    /// `<sender>: <body>\n`, for channel broadcasts and direct messages
    Chat { sender: String, body: Bytes },
    /// One name per line, for CHANNELS and MEMBERS results
    Listing(String),
}

impl Outbound {
    pub fn err(message: impl Into<String>) -> Self {
        Outbound::Err(message.into())
    }

    pub fn chat(sender: impl Into<String>, body: Bytes) -> Self {
        Outbound::Chat {
            sender: sender.into(),
            body,
        }
    }

    /// Encode into a single wire frame, terminated by `\n`
    pub fn encode(&self) -> Bytes {
        match self {
            Outbound::Ok => Bytes::from_static(b"OK\n"),
            Outbound::Err(message) => Bytes::from(format!("{} {}\n", ERR, message)),
            Outbound::Chat { sender, body } => {
                let mut frame = BytesMut::with_capacity(sender.len() + body.len() + 3);
                frame.put_slice(sender.as_bytes());
                frame.put_slice(b": ");
                frame.put_slice(body);
                frame.put_u8(b'\n');
                frame.freeze()
            }
            Outbound::Listing(name) => Bytes::from(format!("{}\n", name)),
        }
    }
}
