//! MIDI sink seam: 3-byte note message framing and the output trait.
//!
//! The engine never talks to hardware directly; it emits [`NoteMessage`]s
//! through whatever [`MidiSink`] it was built with. `arpline-midi-io`
//! provides the midir-backed implementation; [`BufferSink`] collects
//! messages in memory for tests and headless use.

use thiserror::Error;

/// Note-on or note-off, the only two message kinds this engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    NoteOn,
    NoteOff,
}

/// A single 3-byte MIDI channel-voice note message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteMessage {
    pub kind: NoteKind,
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
}

impl NoteMessage {
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            kind: NoteKind::NoteOn,
            channel: channel.min(15), // MIDI channels are 0-15
            note: note & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    /// Velocity 0 by convention on note-off.
    pub fn note_off(channel: u8, note: u8) -> Self {
        Self {
            kind: NoteKind::NoteOff,
            channel: channel.min(15),
            note: note & 0x7F,
            velocity: 0,
        }
    }

    pub fn is_note_on(&self) -> bool {
        self.kind == NoteKind::NoteOn
    }

    pub fn is_note_off(&self) -> bool {
        self.kind == NoteKind::NoteOff
    }

    /// Standard 3-byte wire layout: status, note, velocity.
    pub fn to_bytes(&self) -> [u8; 3] {
        let status = match self.kind {
            NoteKind::NoteOn => 0x90 | self.channel,
            NoteKind::NoteOff => 0x80 | self.channel,
        };
        [status, self.note, self.velocity]
    }
}

/// Error returned by a sink that failed to deliver a message.
///
/// Sends are fire-and-forget: a failure is reported to the caller and never
/// retried, since a late resend would be audibly wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Synchronous, non-blocking output for note messages.
pub trait MidiSink {
    fn send(&mut self, message: NoteMessage) -> Result<(), SinkError>;
}

/// In-memory sink that records every message it receives.
#[derive(Debug, Default)]
pub struct BufferSink {
    messages: Vec<NoteMessage>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[NoteMessage] {
        &self.messages
    }

    pub fn drain(&mut self) -> Vec<NoteMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MidiSink for BufferSink {
    fn send(&mut self, message: NoteMessage) -> Result<(), SinkError> {
        self.messages.push(message);
        Ok(())
    }
}
