//! Live MIDI arpeggiator engine.
//!
//! Captures the notes a performer holds down and, once armed, replays them
//! in a configurable pattern, tempo, and gate length across independently
//! configured output channels, while passing live key presses straight
//! through. Driven by a cooperative once-per-frame [`ArpEngine::tick`]; no
//! background threads.
//!
//! Hardware output lives in `arpline-midi-io`; this crate only emits
//! through the [`MidiSink`] trait.
//!
//! # Example
//!
//! ```
//! use arpline_engine::{ArpEngine, ArpMode, BufferSink};
//! use std::time::Instant;
//!
//! let mut engine = ArpEngine::new(BufferSink::new());
//! let lead = engine.add_channel("Lead").unwrap();
//!
//! // Recording is the initial state: presses are captured and monitored
//! engine.key_pressed(lead, 60, 100).unwrap();
//! engine.key_released(lead, 60).unwrap();
//! engine.key_pressed(lead, 64, 100).unwrap();
//! engine.key_released(lead, 64).unwrap();
//!
//! engine.channel_mut(lead).unwrap().set_mode(ArpMode::Up);
//! engine.play();
//! engine.tick(Instant::now());
//! ```

pub mod error;
pub use error::{Error, Result};

mod sink;
pub use sink::{BufferSink, MidiSink, NoteKind, NoteMessage, SinkError};

mod held;
pub use held::HeldNotes;

mod channel;
pub use channel::{
    ArpChannel, ArpMode, ChannelId, BASE_KEY_NOTE, DEFAULT_GATE, DEFAULT_OCTAVE_SHIFT,
    DEFAULT_VELOCITY, MAX_OCTAVE_SHIFT, MIN_GATE,
};

mod registry;
pub use registry::ChannelRegistry;

mod transport;
pub use transport::{
    Transport, TransportChange, TransportState, DEFAULT_TEMPO_BPM, MAX_TEMPO_BPM, MIN_TEMPO_BPM,
};

mod scheduler;

mod engine;
pub use engine::ArpEngine;
