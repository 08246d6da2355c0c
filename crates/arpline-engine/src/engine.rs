//! Engine facade: wires transport, registry, held keys, and the sink together.
//!
//! Everything runs on one logical timeline: the owner calls [`ArpEngine::tick`]
//! once per frame, and every key or transport action happens between ticks on
//! the same thread. Deferred channel removals are applied at the end of each
//! tick, after all iteration is done.

use crate::channel::{ArpChannel, ChannelId};
use crate::error::{Error, Result};
use crate::held::HeldNotes;
use crate::registry::ChannelRegistry;
use crate::scheduler::{send_or_warn, tick_channel};
use crate::sink::{MidiSink, NoteMessage};
use crate::transport::{Transport, TransportChange, TransportState};
use std::time::Instant;
use tracing::debug;

const DEFAULT_RNG_SEED: u64 = 0x853c49e6748fea9b;

pub struct ArpEngine<S: MidiSink> {
    transport: Transport,
    registry: ChannelRegistry,
    held: HeldNotes,
    rng_state: u64,
    sink: S,
}

impl<S: MidiSink> ArpEngine<S> {
    pub fn new(sink: S) -> Self {
        Self::with_seed(sink, DEFAULT_RNG_SEED)
    }

    /// Seeds the Random-mode index generator, for deterministic playback in
    /// tests.
    pub fn with_seed(sink: S, seed: u64) -> Self {
        Self {
            transport: Transport::new(),
            registry: ChannelRegistry::new(),
            held: HeldNotes::new(),
            rng_state: seed | 1,
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn tempo_bpm(&self) -> f32 {
        self.transport.tempo_bpm()
    }

    pub fn set_tempo(&mut self, bpm: f32) {
        self.transport.set_tempo(bpm);
    }

    /// The Play action. Stopping flushes every sounding note and every held
    /// key, so no note can stay stuck.
    pub fn play(&mut self) {
        match self.transport.play() {
            TransportChange::StartedPlaying => {
                for channel in self.registry.channels_mut() {
                    channel.reset_step_timer();
                }
                debug!("transport: playing");
            }
            TransportChange::Stopped => {
                self.flush_all_notes();
                debug!("transport: stopped");
            }
            _ => {}
        }
    }

    /// The Record action. Entering Recording releases every sounding note
    /// and clears every captured sequence: recording starts from an empty
    /// slate. Leaving Recording flushes nothing.
    pub fn record(&mut self) {
        match self.transport.record() {
            TransportChange::StartedRecording => {
                for channel in self.registry.channels_mut() {
                    if let Some(sounding) = channel.take_sounding() {
                        send_or_warn(
                            &mut self.sink,
                            NoteMessage::note_off(channel.output_channel(), sounding.note),
                        );
                    }
                    channel.clear_notes();
                }
                debug!("transport: recording");
            }
            TransportChange::StoppedRecording => {
                debug!("transport: recording off");
            }
            _ => {}
        }
    }

    // -----------------------------------------------------------------------
    // Channels
    // -----------------------------------------------------------------------

    pub fn add_channel(&mut self, name: impl Into<String>) -> Result<ChannelId> {
        self.registry.add(name)
    }

    pub fn rename_channel(&mut self, id: ChannelId, new_name: impl Into<String>) -> Result<()> {
        self.registry.rename(id, new_name)
    }

    /// Marks a channel for removal; the erase happens at the end of the next
    /// tick, which also releases anything the channel was still sounding.
    pub fn remove_channel(&mut self, id: ChannelId) {
        self.registry.remove(id);
    }

    pub fn channel(&self, id: ChannelId) -> Option<&ArpChannel> {
        self.registry.get(id)
    }

    /// Mutable access for the configuration surface (mode, velocity, octave
    /// shift, gate, output number, transpose). Renaming goes through
    /// [`ArpEngine::rename_channel`] so uniqueness stays enforced.
    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut ArpChannel> {
        self.registry.get_mut(id)
    }

    pub fn channels(&self) -> impl Iterator<Item = &ArpChannel> {
        self.registry.channels()
    }

    // -----------------------------------------------------------------------
    // Live keys
    // -----------------------------------------------------------------------

    /// A key went down. The note sounds immediately regardless of transport
    /// state (live monitoring); while Recording it is also appended to the
    /// channel's captured sequence, duplicates and all.
    pub fn key_pressed(&mut self, id: ChannelId, note: u8, velocity: u8) -> Result<()> {
        let recording = self.transport.is_recording();
        let channel = self.registry.get_mut(id).ok_or(Error::UnknownChannel(id))?;
        let output = channel.output_channel();

        if self.held.press(output, note) {
            // Re-fired press while the key is still down.
            return Ok(());
        }
        if recording {
            channel.record_note(note);
        }
        self.sink.send(NoteMessage::note_on(output, note, velocity))?;
        Ok(())
    }

    /// A key came up. Emits the note-off only if the press was tracked.
    pub fn key_released(&mut self, id: ChannelId, note: u8) -> Result<()> {
        let channel = self.registry.get(id).ok_or(Error::UnknownChannel(id))?;
        let output = channel.output_channel();

        if self.held.release(output, note) {
            self.sink.send(NoteMessage::note_off(output, note))?;
        }
        Ok(())
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advances the engine by one frame. `now` must come from a monotonic
    /// clock; a long gap simply produces an immediate step on this tick.
    pub fn tick(&mut self, now: Instant) {
        if self.transport.state() == TransportState::Playing {
            let step_interval = self.transport.step_interval();
            for channel in self.registry.channels_mut() {
                tick_channel(channel, now, step_interval, &mut self.rng_state, &mut self.sink);
            }
        } else {
            // Idle: keep the step window fresh so entering Playing steps
            // immediately.
            for channel in self.registry.channels_mut() {
                channel.reset_step_timer();
            }
        }

        for mut removed in self.registry.apply_pending_removals() {
            if let Some(sounding) = removed.take_sounding() {
                send_or_warn(
                    &mut self.sink,
                    NoteMessage::note_off(removed.output_channel(), sounding.note),
                );
            }
            for (channel, note) in self.held.drain_channel(removed.output_channel()) {
                send_or_warn(&mut self.sink, NoteMessage::note_off(channel, note));
            }
            debug!("removed channel {} ({})", removed.id(), removed.name());
        }
    }

    /// Releases everything on the way out, like Stop: no held key or
    /// sounding note survives shutdown.
    pub fn shutdown(&mut self) {
        self.flush_all_notes();
    }

    fn flush_all_notes(&mut self) {
        for channel in self.registry.channels_mut() {
            if let Some(sounding) = channel.take_sounding() {
                send_or_warn(
                    &mut self.sink,
                    NoteMessage::note_off(channel.output_channel(), sounding.note),
                );
            }
            channel.reset_step_timer();
        }
        for (channel, note) in self.held.flush_all() {
            send_or_warn(&mut self.sink, NoteMessage::note_off(channel, note));
        }
    }
}
