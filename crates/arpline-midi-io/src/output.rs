//! MIDI output: device enumeration and a hardware-backed sink.
//!
//! Everything here is synchronous and runs on the caller's thread; the
//! engine tick is the only producer, so there is no need for a dedicated
//! output thread or command queue.

use crate::error::{Error, Result};
use arpline_engine::{MidiSink, NoteMessage, SinkError};
use midir::{MidiOutput, MidiOutputConnection};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

/// A [`MidiSink`] that writes to a hardware (or virtual) MIDI output port.
///
/// At most one port is connected at a time; connecting again closes the
/// previous connection first. Sending without a connection is an error, so
/// the engine logs rather than silently dropping notes.
pub struct PortSink {
    connection: Option<MidiOutputConnection>,
    connected_name: Option<String>,
}

impl PortSink {
    pub fn new() -> Self {
        Self {
            connection: None,
            connected_name: None,
        }
    }

    /// Enumerates the output ports currently visible to the system. Returns
    /// an empty list when the MIDI backend cannot be initialized.
    pub fn list_devices() -> Vec<MidiOutputDevice> {
        let mut devices = Vec::new();
        if let Ok(midi_output) = MidiOutput::new("arpline-device-list") {
            let ports = midi_output.ports();
            for (index, port) in ports.iter().enumerate() {
                let name = midi_output
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                devices.push(MidiOutputDevice { index, name });
            }
        }
        devices
    }

    /// Connects to the output port at `device_index`, closing any existing
    /// connection first.
    pub fn connect(&mut self, device_index: usize) -> Result<()> {
        self.disconnect();

        let midi_output = MidiOutput::new("arpline-midi-output")?;
        let ports = midi_output.ports();
        let port = ports.get(device_index).ok_or_else(|| {
            Error::MidiDevice(format!("MIDI output device {} not found", device_index))
        })?;

        let port_name = midi_output
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", device_index));
        let connection = midi_output.connect(port, "arpline-output")?;

        debug!("connected to MIDI output '{}'", port_name);
        self.connection = Some(connection);
        self.connected_name = Some(port_name);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            debug!(
                "disconnected from MIDI output '{}'",
                self.connected_name.as_deref().unwrap_or("?")
            );
        }
        self.connected_name = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connected_device_name(&self) -> Option<&str> {
        self.connected_name.as_deref()
    }
}

impl Default for PortSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiSink for PortSink {
    fn send(&mut self, message: NoteMessage) -> std::result::Result<(), SinkError> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| SinkError("no MIDI output device connected".to_string()))?;
        connection
            .send(&message.to_bytes())
            .map_err(|e| SinkError(e.to_string()))
    }
}

impl Drop for PortSink {
    fn drop(&mut self) {
        self.disconnect();
    }
}
