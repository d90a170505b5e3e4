//! MIDI input handling
//!
//! Receives raw MIDI bytes from the midir callback, parses them with midly,
//! and forwards the events to the surface's event thread via a flume channel.
//! The surface drains the channel and handles events in arrival order.

use crate::connection::{MidiConnection, MidiConnectionError};
use crate::mapping::{GRID_SIZE, PAD_INDEX_BASE};
use flume::Sender;
use midir::MidiInputConnection;
use midly::live::LiveEvent;
use midly::MidiMessage;

/// MIDI channel the pad grid reports on
pub const PAD_CHANNEL: u8 = 0;

/// Raw MIDI input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiInputEvent {
    /// Note On message
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off message
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Control Change message
    ControlChange { channel: u8, cc: u8, value: u8 },
}

/// A pad press (velocity > 0) or release (velocity 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadEvent {
    /// Note number the pad reports
    pub index: u8,
    pub velocity: u8,
}

impl PadEvent {
    pub fn is_press(&self) -> bool {
        self.velocity > 0
    }
}

impl MidiInputEvent {
    /// Parse raw MIDI bytes into an event
    ///
    /// Note On with velocity 0 is treated as Note Off. Anything other than
    /// notes and control changes is ignored.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let LiveEvent::Midi { channel, message } = LiveEvent::parse(data).ok()? else {
            return None;
        };
        let channel = channel.as_int();

        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => Some(Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: 0,
            }),
            MidiMessage::NoteOn { key, vel } => Some(Self::NoteOn {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::NoteOff { key, vel } => Some(Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::Controller { controller, value } => Some(Self::ControlChange {
                channel,
                cc: controller.as_int(),
                value: value.as_int(),
            }),
            _ => None,
        }
    }

    /// Get the MIDI channel
    pub fn channel(&self) -> u8 {
        match self {
            Self::NoteOn { channel, .. } => *channel,
            Self::NoteOff { channel, .. } => *channel,
            Self::ControlChange { channel, .. } => *channel,
        }
    }

    /// Check if this is a "press" event (Note On or CC > threshold)
    pub fn is_press(&self) -> bool {
        match self {
            Self::NoteOn { velocity, .. } => *velocity > 0,
            Self::ControlChange { value, .. } => *value > 63,
            Self::NoteOff { .. } => false,
        }
    }

    /// Get the value (velocity for notes, value for CC)
    pub fn value(&self) -> u8 {
        match self {
            Self::NoteOn { velocity, .. } => *velocity,
            Self::NoteOff { velocity, .. } => *velocity,
            Self::ControlChange { value, .. } => *value,
        }
    }

    /// Interpret as a pad grid event
    ///
    /// Releases always carry velocity 0, whatever the Note Off velocity was.
    pub fn pad_event(&self) -> Option<PadEvent> {
        let pad_range = PAD_INDEX_BASE..PAD_INDEX_BASE + GRID_SIZE * GRID_SIZE;
        match *self {
            Self::NoteOn {
                channel,
                note,
                velocity,
            } if channel == PAD_CHANNEL && pad_range.contains(&note) => Some(PadEvent {
                index: note,
                velocity,
            }),
            Self::NoteOff { channel, note, .. }
                if channel == PAD_CHANNEL && pad_range.contains(&note) =>
            {
                Some(PadEvent {
                    index: note,
                    velocity: 0,
                })
            }
            _ => None,
        }
    }
}

/// Callback data passed to midir
struct CallbackData {
    event_tx: Sender<MidiInputEvent>,
}

/// MIDI input handler
///
/// Owns the midir connection and forwards parsed events.
pub struct MidiInputHandler {
    /// The midir connection (kept alive for the duration)
    _connection: MidiInputConnection<CallbackData>,
}

impl MidiInputHandler {
    /// Connect to the first input port matching `port_match`
    pub fn connect(
        port_match: &str,
        event_tx: Sender<MidiInputEvent>,
    ) -> Result<Self, MidiConnectionError> {
        let (midi_in, port) = MidiConnection::find_input_port(port_match)?;

        let connection = midi_in
            .connect(
                &port,
                "apc64-surface-input",
                Self::midi_callback,
                CallbackData { event_tx },
            )
            .map_err(|e| MidiConnectionError::ConnectionError(e.to_string()))?;

        log::info!("MIDI: Input handler connected");

        Ok(Self {
            _connection: connection,
        })
    }

    /// Called from the MIDI driver thread; must not block
    fn midi_callback(_timestamp: u64, data: &[u8], callback_data: &mut CallbackData) {
        let Some(event) = MidiInputEvent::parse(data) else {
            return;
        };

        if callback_data.event_tx.try_send(event).is_err() {
            log::warn!("MIDI: Event channel full, dropping {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let event = MidiInputEvent::parse(&[0x90, 0x3C, 0x7F]).unwrap();
        assert_eq!(
            event,
            MidiInputEvent::NoteOn {
                channel: 0,
                note: 60,
                velocity: 127
            }
        );
        assert!(event.is_press());
    }

    #[test]
    fn test_parse_note_on_zero_velocity() {
        // Note On with velocity 0 should be treated as Note Off
        let event = MidiInputEvent::parse(&[0x91, 0x3C, 0x00]).unwrap();
        assert!(matches!(
            event,
            MidiInputEvent::NoteOff {
                channel: 1,
                note: 60,
                ..
            }
        ));
        assert!(!event.is_press());
    }

    #[test]
    fn test_parse_cc() {
        let event = MidiInputEvent::parse(&[0xB2, 0x07, 0x64]).unwrap();
        assert_eq!(
            event,
            MidiInputEvent::ControlChange {
                channel: 2,
                cc: 7,
                value: 100
            }
        );
        assert_eq!(event.channel(), 2);
        assert_eq!(event.value(), 100);
    }

    #[test]
    fn test_parse_ignores_other_messages() {
        // Pitch bend
        assert_eq!(MidiInputEvent::parse(&[0xE0, 0x00, 0x40]), None);
        // Truncated
        assert_eq!(MidiInputEvent::parse(&[0x90, 0x3C]), None);
        assert_eq!(MidiInputEvent::parse(&[]), None);
    }

    #[test]
    fn test_pad_events() {
        let press = MidiInputEvent::parse(&[0x90, 24, 100]).unwrap();
        assert_eq!(
            press.pad_event(),
            Some(PadEvent {
                index: 24,
                velocity: 100
            })
        );

        let release = MidiInputEvent::parse(&[0x80, 87, 64]).unwrap();
        let pad = release.pad_event().unwrap();
        assert_eq!(pad.index, 87);
        assert!(!pad.is_press());

        // Outside the grid or on another channel
        assert_eq!(MidiInputEvent::parse(&[0x90, 88, 100]).unwrap().pad_event(), None);
        assert_eq!(MidiInputEvent::parse(&[0x90, 23, 100]).unwrap().pad_event(), None);
        assert_eq!(MidiInputEvent::parse(&[0x93, 40, 100]).unwrap().pad_event(), None);
        assert_eq!(MidiInputEvent::parse(&[0xB0, 40, 100]).unwrap().pad_event(), None);
    }
}
