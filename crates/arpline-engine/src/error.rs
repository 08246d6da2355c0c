//! Error types for the arpeggiator engine.

use crate::channel::ChannelId;
use crate::sink::SinkError;
use thiserror::Error;

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Channel name already exists: {0}")]
    NameConflict(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(ChannelId),

    #[error("MIDI send failed: {0}")]
    Sink(#[from] SinkError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
