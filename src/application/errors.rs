//! Application layer errors

use thiserror::Error;

/// Frames that cannot be turned into a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty command")]
    EmptyCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command is not valid UTF-8")]
    InvalidUtf8,

    #[error("failed to scan target")]
    MissingTarget,

    #[error("failed to scan length: {0:?}")]
    InvalidLength(String),

    #[error("message body of {len} bytes exceeds the limit of {max} bytes")]
    BodyTooLong { len: usize, max: usize },

    #[error("message body is longer than the declared {0} bytes")]
    TrailingData(usize),
}

/// Reading one frame either fails at the transport, which ends the
/// connection, or at the protocol, which is answered and skipped
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Malformed usernames and channel names
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} is empty")]
    Empty { kind: &'static str },

    #[error("{kind} does not start with {sigil}")]
    MissingSigil { kind: &'static str, sigil: char },

    #[error("{kind} excluding {sigil} is empty")]
    EmptyAfterSigil { kind: &'static str, sigil: char },

    #[error("{kind} contains whitespace")]
    Whitespace { kind: &'static str },
}

/// Failures detected by a connection before anything reaches the workplace.
/// The Display text is what follows `ERR ` on the wire.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    #[error("failed to {action}: {source}")]
    Validation {
        action: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("failed to {action}: no session: register first")]
    NoSession { action: &'static str },

    #[error("failed to send message: invalid target format: format should start either @ or #: {0}")]
    InvalidTarget(String),
}

/// Outbound side of a connection is gone
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("connection is closed")]
    Closed,
}

/// Listener and accept loop errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
