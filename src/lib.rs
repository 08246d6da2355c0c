//! # Arpline - Live MIDI Arpeggiator
//!
//! Umbrella crate coordinating the arpeggiator subsystems:
//! - **arpline-engine** - Held-note tracking, channel registry, stepping
//!   scheduler, and the record/play/stop transport
//! - **arpline-midi-io** - Hardware MIDI output via `midir` (feature `midi-io`)
//!
//! ## Quick Start
//!
//! ```
//! use arpline::{ArpEngine, ArpMode, BufferSink};
//! use std::time::Instant;
//!
//! let mut engine = ArpEngine::new(BufferSink::new());
//! let lead = engine.add_channel("Lead").unwrap();
//!
//! // The engine starts out Recording: held keys sound and are captured
//! engine.key_pressed(lead, 60, 100).unwrap();
//! engine.key_released(lead, 60).unwrap();
//!
//! engine.channel_mut(lead).unwrap().set_mode(ArpMode::Up);
//! engine.play();
//! engine.tick(Instant::now());
//! ```
//!
//! To drive hardware instead of the in-memory sink, build the engine over an
//! [`arpline_midi_io::PortSink`] (requires the `midi-io` feature).
//!
//! ## Feature Flags
//!
//! - `default` - Engine plus hardware MIDI output
//! - `midi-io` - Hardware MIDI output (pulls in the system MIDI backend)

/// Re-export of arpline-engine for direct access
pub use arpline_engine as engine;

pub use arpline_engine::{
    ArpChannel,
    ArpEngine,
    ArpMode,
    BufferSink,
    ChannelId,
    ChannelRegistry,

    // Error
    Error,
    HeldNotes,
    MidiSink,
    NoteKind,
    NoteMessage,
    Result,
    SinkError,

    // Transport
    Transport,
    TransportChange,
    TransportState,
};

pub use arpline_engine::{
    BASE_KEY_NOTE, DEFAULT_GATE, DEFAULT_OCTAVE_SHIFT, DEFAULT_TEMPO_BPM, DEFAULT_VELOCITY,
    MAX_OCTAVE_SHIFT, MAX_TEMPO_BPM, MIN_GATE, MIN_TEMPO_BPM,
};

#[cfg(feature = "midi-io")]
pub use arpline_midi_io as midi_io;

#[cfg(feature = "midi-io")]
pub use arpline_midi_io::{MidiOutputDevice, PortSink};
