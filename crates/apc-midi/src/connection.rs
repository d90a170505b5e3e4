//! MIDI port discovery and connection
//!
//! Uses midir for cross-platform MIDI I/O (ALSA on Linux, CoreMIDI on macOS, WinMM on Windows).

use midir::{MidiInput, MidiInputPort, MidiOutput, MidiOutputConnection};

/// Error type for MIDI connection operations
#[derive(Debug, thiserror::Error)]
pub enum MidiConnectionError {
    #[error("Failed to initialize MIDI input: {0}")]
    InputInitError(String),

    #[error("Failed to initialize MIDI output: {0}")]
    OutputInitError(String),

    #[error("No MIDI input ports available")]
    NoInputPorts,

    #[error("No MIDI port found matching pattern: {0}")]
    PortNotFound(String),

    #[error("Failed to connect to MIDI port: {0}")]
    ConnectionError(String),

    #[error("Failed to get port info: {0}")]
    PortInfoError(String),
}

/// Port lookup helpers
pub struct MidiConnection;

impl MidiConnection {
    /// Find the first input port whose name contains `port_match` (case-insensitive)
    ///
    /// Returns the MidiInput so the caller can attach its own callback.
    pub fn find_input_port(
        port_match: &str,
    ) -> Result<(MidiInput, MidiInputPort), MidiConnectionError> {
        let pattern = port_match.to_lowercase();

        let midi_in = MidiInput::new("apc64-surface-in")
            .map_err(|e| MidiConnectionError::InputInitError(e.to_string()))?;

        let in_ports = midi_in.ports();
        if in_ports.is_empty() {
            return Err(MidiConnectionError::NoInputPorts);
        }

        let input_port = in_ports
            .into_iter()
            .find(|port| {
                midi_in
                    .port_name(port)
                    .map(|name| name.to_lowercase().contains(&pattern))
                    .unwrap_or(false)
            })
            .ok_or_else(|| MidiConnectionError::PortNotFound(port_match.to_string()))?;

        let port_name = midi_in
            .port_name(&input_port)
            .map_err(|e| MidiConnectionError::PortInfoError(e.to_string()))?;

        log::info!("MIDI: Found input port: {}", port_name);

        Ok((midi_in, input_port))
    }

    /// Connect to the first output port whose name contains `port_match`
    pub fn connect_output(port_match: &str) -> Result<MidiOutputConnection, MidiConnectionError> {
        let pattern = port_match.to_lowercase();

        let midi_out = MidiOutput::new("apc64-surface-out")
            .map_err(|e| MidiConnectionError::OutputInitError(e.to_string()))?;

        let output_port = midi_out
            .ports()
            .into_iter()
            .find(|port| {
                midi_out
                    .port_name(port)
                    .map(|name| name.to_lowercase().contains(&pattern))
                    .unwrap_or(false)
            })
            .ok_or_else(|| MidiConnectionError::PortNotFound(port_match.to_string()))?;

        let port_name = midi_out
            .port_name(&output_port)
            .map_err(|e| MidiConnectionError::PortInfoError(e.to_string()))?;
        log::info!("MIDI: Found output port: {}", port_name);

        midi_out
            .connect(&output_port, "apc64-surface-output")
            .map_err(|e| MidiConnectionError::ConnectionError(e.to_string()))
    }
}
