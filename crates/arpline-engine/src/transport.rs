//! Record/play/stop transport state.
//!
//! Two booleans are stored (`recording`, `paused`) but only three states
//! are reachable through the Play and Record actions, so the derived
//! [`TransportState`] triple is the authoritative model. The scheduler runs
//! strictly in `Playing`.

use std::time::Duration;

pub const MIN_TEMPO_BPM: f32 = 80.0;
pub const MAX_TEMPO_BPM: f32 = 180.0;
pub const DEFAULT_TEMPO_BPM: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Recording,
    Playing,
    Stopped,
}

/// What a Play/Record action asks the engine to do. Transitions carry their
/// flush obligations with them so the caller cannot forget one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportChange {
    /// Playback began; step timers start a fresh window.
    StartedPlaying,
    /// Playback halted; every sounding note and held key must be flushed.
    Stopped,
    /// Recording began; sounding notes flush and captured sequences clear.
    StartedRecording,
    /// Recording ended; no flush or clear, the paused flag already encodes
    /// whichever of Playing/Stopped becomes visible.
    StoppedRecording,
}

#[derive(Debug)]
pub struct Transport {
    recording: bool,
    paused: bool,
    tempo_bpm: f32,
}

impl Transport {
    /// Starts in Recording, matching a fresh session waiting for input.
    pub fn new() -> Self {
        Self {
            recording: true,
            paused: true,
            tempo_bpm: DEFAULT_TEMPO_BPM,
        }
    }

    pub fn state(&self) -> TransportState {
        if self.recording {
            TransportState::Recording
        } else if self.paused {
            TransportState::Stopped
        } else {
            TransportState::Playing
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// The Play action: Recording -> Playing, Playing -> Stopped,
    /// Stopped -> Playing.
    pub fn play(&mut self) -> TransportChange {
        match self.state() {
            TransportState::Recording => {
                self.recording = false;
                self.paused = false;
                TransportChange::StartedPlaying
            }
            TransportState::Playing => {
                self.paused = true;
                TransportChange::Stopped
            }
            TransportState::Stopped => {
                self.paused = false;
                TransportChange::StartedPlaying
            }
        }
    }

    /// The Record action: toggles the recording flag independent of the
    /// paused flag.
    pub fn record(&mut self) -> TransportChange {
        self.recording = !self.recording;
        if self.recording {
            TransportChange::StartedRecording
        } else {
            TransportChange::StoppedRecording
        }
    }

    pub fn tempo_bpm(&self) -> f32 {
        self.tempo_bpm
    }

    /// Tempo is shared across all channels and clamped to the playable range.
    pub fn set_tempo(&mut self, bpm: f32) {
        self.tempo_bpm = if bpm.is_nan() {
            DEFAULT_TEMPO_BPM
        } else {
            bpm.clamp(MIN_TEMPO_BPM, MAX_TEMPO_BPM)
        };
    }

    /// Time between successive note-on events: 60000 / BPM milliseconds.
    pub fn step_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.tempo_bpm as f64)
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
