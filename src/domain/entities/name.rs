use std::fmt;

use crate::application::errors::ValidationError;

/// Registered handle, always `@` followed by at least one character
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

/// Channel handle, always `#` followed by at least one character
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelName(String);

impl Username {
    pub const SIGIL: char = '@';

    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        validate(&raw, "username", Self::SIGIL)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ChannelName {
    pub const SIGIL: char = '#';

    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        validate(&raw, "channel name", Self::SIGIL)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Names end up as tokens in SEND frames, so they may not contain whitespace.
fn validate(raw: &str, kind: &'static str, sigil: char) -> Result<(), ValidationError> {
    let Some(rest) = raw.strip_prefix(sigil) else {
        if raw.is_empty() {
            return Err(ValidationError::Empty { kind });
        }
        return Err(ValidationError::MissingSigil { kind, sigil });
    };
    if rest.is_empty() {
        return Err(ValidationError::EmptyAfterSigil { kind, sigil });
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(ValidationError::Whitespace { kind });
    }
    Ok(())
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
