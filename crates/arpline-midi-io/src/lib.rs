//! Hardware MIDI output for the arpline arpeggiator engine.
//!
//! Wraps a `midir` output port in the engine's [`MidiSink`] trait so an
//! [`arpline_engine::ArpEngine`] can drive real devices. Disable the
//! `midi-io` feature to build without a system MIDI backend.
//!
//! [`MidiSink`]: arpline_engine::MidiSink

pub mod error;
pub use error::{Error, Result};

#[cfg(feature = "midi-io")]
mod output;
#[cfg(feature = "midi-io")]
pub use output::{MidiOutputDevice, PortSink};
