use bytes::Bytes;

use crate::application::errors::SinkError;

/// Sink trait - the write side of one client connection.
///
/// Implementations must accept whole frames and keep frames from different
/// callers from interleaving. Delivery is best effort: an `Err` means the
/// connection is gone and the frame was dropped.
pub trait MessageSink: Send + Sync {
    fn send(&self, frame: Bytes) -> Result<(), SinkError>;
}
