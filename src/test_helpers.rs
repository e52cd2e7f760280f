use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::application::errors::SinkError;
use crate::domain::entities::{ConnectionId, Member, Username};
use crate::domain::traits::MessageSink;

/// In-memory sink that keeps every frame it accepts.
/// Clones share the same buffer, so a test can hand one clone to a member
/// and read what arrived through the other.
#[derive(Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<Bytes>>>,
    closed: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose connection is already gone
    pub fn closed() -> Self {
        Self {
            closed: true,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> Vec<Bytes> {
        self.frames.lock().expect("sink lock").clone()
    }

    /// Everything received so far, concatenated
    pub fn text(&self) -> String {
        self.frames()
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.frames.lock().expect("sink lock").clear();
    }
}

impl MessageSink for RecordingSink {
    fn send(&self, frame: Bytes) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.frames.lock().expect("sink lock").push(frame);
        Ok(())
    }
}

/// Build a member on a fresh connection, returning the sink it writes to
pub fn member(name: &str) -> (Member, RecordingSink) {
    let sink = RecordingSink::new();
    (member_with_sink(name, sink.clone()), sink)
}

pub fn member_with_sink(name: &str, sink: RecordingSink) -> Member {
    Member::new(
        Username::parse(name).expect("valid username"),
        ConnectionId::new(),
        Arc::new(sink),
    )
}
