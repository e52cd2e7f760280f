//! Frame parser - Reads requests off a connection's byte stream
//!
//! Every frame is `KIND [ARGS]` terminated by `\n` (a preceding `\r` is
//! tolerated). SEND is the exception: its header is
//! `SEND <target> <len> ` and is followed by exactly `len` raw body bytes,
//! which may contain spaces and newlines. The body starts right after the
//! single space that follows `<len>`, or on the next line when `<len>` ends
//! the header line. After the body the rest of that line must be empty,
//! unless the body itself ends with the newline.

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::application::errors::{FrameError, ProtocolError};

/// A well-formed frame, before any username or channel validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Register { name: String },
    Delete,
    Join { channel: String },
    Leave { channel: String },
    Channels,
    Members,
    Send { target: String, body: Bytes },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Register { .. } => "REGISTER",
            Request::Delete => "DELETE",
            Request::Join { .. } => "JOIN",
            Request::Leave { .. } => "LEAVE",
            Request::Channels => "CHANNELS",
            Request::Members => "MEMBERS",
            Request::Send { .. } => "SEND",
        }
    }
}

/// Pulls one [`Request`] at a time from a buffered reader
pub struct FrameReader<R> {
    reader: R,
    max_body_bytes: usize,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R, max_body_bytes: usize) -> Self {
        Self {
            reader,
            max_body_bytes,
        }
    }

    /// Read the next request. `Ok(None)` means the peer closed the stream.
    ///
    /// A protocol error consumes the offending frame, so the caller can
    /// reply and keep reading.
    pub async fn next_request(&mut self) -> Result<Option<Request>, FrameError> {
        loop {
            let mut line = Vec::new();
            if self.reader.read_until(b'\n', &mut line).await? == 0 {
                return Ok(None);
            }
            // Blank lines between frames carry nothing
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return self.parse(line).await.map(Some);
        }
    }

    async fn parse(&mut self, line: Vec<u8>) -> Result<Request, FrameError> {
        let (kind_start, kind_end) = next_token(&line, 0).ok_or(ProtocolError::EmptyCommand)?;
        let kind = utf8(&line[kind_start..kind_end])?;

        let args = || -> Result<String, ProtocolError> {
            Ok(utf8(strip_line_end(&line[kind_end..]))?.trim().to_string())
        };

        let request = match kind {
            "REGISTER" => Request::Register { name: args()? },
            "DELETE" => Request::Delete,
            "JOIN" => Request::Join { channel: args()? },
            "LEAVE" => Request::Leave { channel: args()? },
            "CHANNELS" => Request::Channels,
            "MEMBERS" => Request::Members,
            "SEND" => return self.parse_send(&line, kind_end).await,
            other => return Err(ProtocolError::UnknownCommand(other.to_string()).into()),
        };
        Ok(request)
    }

    async fn parse_send(&mut self, line: &[u8], from: usize) -> Result<Request, FrameError> {
        let (target_start, target_end) = next_token(line, from).ok_or(ProtocolError::MissingTarget)?;
        let target = utf8(&line[target_start..target_end])?.to_string();

        let (len_start, len_end) = next_token(line, target_end)
            .ok_or_else(|| ProtocolError::InvalidLength(String::new()))?;
        let len_text = utf8(&line[len_start..len_end])?;
        let len: usize = len_text
            .parse()
            .map_err(|_| ProtocolError::InvalidLength(len_text.to_string()))?;

        let header_ends_line = line.get(len_end) != Some(&b' ');
        if header_ends_line && len == 0 {
            return Ok(Request::Send {
                target,
                body: Bytes::new(),
            });
        }
        let body_start = if header_ends_line { line.len() } else { len_end + 1 };
        let buffered = &line[body_start..];

        if len > self.max_body_bytes {
            if buffered.len() <= len {
                let last = match self.skip(len - buffered.len()).await? {
                    Some(last) => Some(last),
                    None => buffered.last().copied(),
                };
                if last != Some(b'\n') {
                    self.read_rest_of_line().await?;
                }
            }
            return Err(ProtocolError::BodyTooLong {
                len,
                max: self.max_body_bytes,
            }
            .into());
        }

        if buffered.len() > len {
            if !is_line_end(&buffered[len..]) {
                return Err(ProtocolError::TrailingData(len).into());
            }
            return Ok(Request::Send {
                target,
                body: Bytes::copy_from_slice(&buffered[..len]),
            });
        }

        let mut body = Vec::with_capacity(len);
        body.extend_from_slice(buffered);
        let missing = len - buffered.len();
        if missing > 0 {
            let filled = body.len();
            body.resize(len, 0);
            self.reader.read_exact(&mut body[filled..]).await?;
        }
        // A body that ends in a newline already closed its line
        if body.last() != Some(&b'\n') && !is_line_end(&self.read_rest_of_line().await?) {
            return Err(ProtocolError::TrailingData(len).into());
        }

        Ok(Request::Send {
            target,
            body: Bytes::from(body),
        })
    }

    async fn read_rest_of_line(&mut self) -> std::io::Result<Vec<u8>> {
        let mut rest = Vec::new();
        self.reader.read_until(b'\n', &mut rest).await?;
        Ok(rest)
    }

    /// Discard `n` bytes, failing if the stream ends first. Returns the
    /// last byte discarded.
    async fn skip(&mut self, mut n: usize) -> std::io::Result<Option<u8>> {
        let mut last = None;
        while n > 0 {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Err(std::io::ErrorKind::UnexpectedEof.into());
            }
            let taken = available.len().min(n);
            last = Some(available[taken - 1]);
            self.reader.consume(taken);
            n -= taken;
        }
        Ok(last)
    }
}

/// Bounds of the next space-separated token at or after `from`, stopping at
/// the end of the line
fn next_token(line: &[u8], from: usize) -> Option<(usize, usize)> {
    let is_sep = |b: &u8| *b == b' ' || *b == b'\t';
    let is_end = |b: &u8| *b == b'\r' || *b == b'\n';

    let rest = line.get(from..)?;
    let start = from + rest.iter().position(|b| !is_sep(b))?;
    if is_end(&line[start]) {
        return None;
    }
    let end = line[start..]
        .iter()
        .position(|b| is_sep(b) || is_end(b))
        .map_or(line.len(), |offset| start + offset);
    Some((start, end))
}

fn strip_line_end(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

fn is_line_end(bytes: &[u8]) -> bool {
    strip_line_end(bytes).is_empty()
}

fn utf8(bytes: &[u8]) -> Result<&str, ProtocolError> {
    std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8)
}
