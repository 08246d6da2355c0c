//! Arpeggio voices and their configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// MIDI note number of the lowest key the capture keyboard exposes.
pub const BASE_KEY_NOTE: u8 = 24;

pub const MAX_OCTAVE_SHIFT: u8 = 8;
pub const DEFAULT_OCTAVE_SHIFT: u8 = 3;
pub const DEFAULT_VELOCITY: u8 = 100;
pub const DEFAULT_GATE: f32 = 0.4;

/// Floor applied to gate fractions so a note always sounds for some time.
pub const MIN_GATE: f32 = 0.01;

/// Stable identity of an engine channel. Independent of the MIDI output
/// channel number the voice targets; the two are configured separately.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChannelId(pub u32);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Traversal pattern applied to a channel's captured notes during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArpMode {
    /// Ascending by pitch, wrapping at the top.
    #[default]
    Up,
    /// Descending by pitch, wrapping at the bottom.
    Down,
    /// Up then down; each endpoint is sounded twice in a row.
    PingPongInclusive,
    /// Up then down; endpoints are never repeated.
    PingPongExclusive,
    /// Uniformly random index each step.
    Random,
    /// Raw capture order, unsorted.
    InsertionOrder,
}

/// The note a channel is currently sounding and when it started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SoundingNote {
    pub note: u8,
    pub started: Instant,
}

/// One independently configured arpeggio voice.
///
/// Configuration fields go through setters that clamp to their documented
/// ranges; playback bookkeeping (cursor, ping-pong direction, sounding note,
/// step timer) is crate-internal and driven by the scheduler.
#[derive(Debug)]
pub struct ArpChannel {
    id: ChannelId,
    name: String,
    output_channel: u8,
    mode: ArpMode,
    octave_shift: u8,
    velocity: u8,
    gate: f32,
    pub(crate) notes: Vec<u8>,
    pub(crate) cursor: usize,
    pub(crate) direction: i8,
    pub(crate) sounding: Option<SoundingNote>,
    pub(crate) last_step: Option<Instant>,
}

impl ArpChannel {
    pub(crate) fn new(id: ChannelId, name: String, output_channel: u8) -> Self {
        Self {
            id,
            name,
            output_channel: output_channel.min(15),
            mode: ArpMode::default(),
            octave_shift: DEFAULT_OCTAVE_SHIFT,
            velocity: DEFAULT_VELOCITY,
            gate: DEFAULT_GATE,
            notes: Vec::new(),
            cursor: 0,
            direction: 1,
            sounding: None,
            last_step: None,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn output_channel(&self) -> u8 {
        self.output_channel
    }

    pub fn set_output_channel(&mut self, channel: u8) {
        self.output_channel = channel.min(15);
    }

    pub fn mode(&self) -> ArpMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ArpMode) {
        self.mode = mode;
    }

    pub fn octave_shift(&self) -> u8 {
        self.octave_shift
    }

    pub fn set_octave_shift(&mut self, shift: u8) {
        self.octave_shift = shift.min(MAX_OCTAVE_SHIFT);
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: u8) {
        self.velocity = velocity & 0x7F;
    }

    pub fn gate(&self) -> f32 {
        self.gate
    }

    /// Gate fraction is clamped to (0, 1]: values at or below zero become a
    /// small positive floor, values above one become one.
    pub fn set_gate(&mut self, gate: f32) {
        self.gate = if gate.is_nan() {
            DEFAULT_GATE
        } else {
            gate.clamp(MIN_GATE, 1.0)
        };
    }

    /// Absolute pitch for a key offset, with this channel's octave shift
    /// baked in. Octave shift applies at capture time, not playback time.
    pub fn note_for_key(&self, key_offset: u8) -> u8 {
        let note =
            BASE_KEY_NOTE as u16 + self.octave_shift as u16 * 12 + key_offset as u16;
        note.min(127) as u8
    }

    /// The captured sequence in raw insertion order.
    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    pub(crate) fn record_note(&mut self, note: u8) {
        self.notes.push(note & 0x7F);
    }

    /// The step-ordered view the cursor indexes into: numerically ascending,
    /// except InsertionOrder which keeps the raw capture order.
    pub(crate) fn step_view(&self) -> Vec<u8> {
        let mut view = self.notes.clone();
        if self.mode != ArpMode::InsertionOrder {
            view.sort_unstable();
        }
        view
    }

    /// Clears the captured sequence and resets playback bookkeeping.
    /// Does not touch the sounding note; the caller releases it first.
    pub(crate) fn clear_notes(&mut self) {
        self.notes.clear();
        self.cursor = 0;
        self.direction = 1;
    }

    /// Transposes every captured note in place, clamping to [0, 127].
    /// The currently sounding note and the cursor are left alone.
    pub fn transpose(&mut self, semitones: i8) {
        for note in &mut self.notes {
            *note = (*note as i16 + semitones as i16).clamp(0, 127) as u8;
        }
    }

    pub(crate) fn take_sounding(&mut self) -> Option<SoundingNote> {
        self.sounding.take()
    }

    pub(crate) fn reset_step_timer(&mut self) {
        self.last_step = None;
    }
}
