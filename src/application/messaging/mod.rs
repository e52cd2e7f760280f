//! Message handling - Frame parsing and session dispatch

pub mod dispatcher;
pub mod parser;

pub use dispatcher::Session;
pub use parser::{FrameReader, Request};
