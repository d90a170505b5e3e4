//! Control addressing

use crate::input::MidiInputEvent;
use serde::{Deserialize, Serialize};

/// MIDI address of a physical control (channel + note/CC)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MidiAddress {
    /// Note On/Off message
    Note {
        /// MIDI channel (0-15)
        channel: u8,
        /// Note number (0-127)
        note: u8,
    },
    /// Control Change message
    #[serde(rename = "control_change")]
    CC {
        /// MIDI channel (0-15)
        channel: u8,
        /// CC number (0-127)
        cc: u8,
    },
}

impl MidiAddress {
    pub fn note(channel: u8, note: u8) -> Self {
        Self::Note { channel, note }
    }

    pub fn cc(channel: u8, cc: u8) -> Self {
        Self::CC { channel, cc }
    }

    /// Address an input event came from
    pub fn of(event: &MidiInputEvent) -> Self {
        match *event {
            MidiInputEvent::NoteOn { channel, note, .. }
            | MidiInputEvent::NoteOff { channel, note, .. } => Self::Note { channel, note },
            MidiInputEvent::ControlChange { channel, cc, .. } => Self::CC { channel, cc },
        }
    }

    /// Message that sends `value` to this control (LEDs, element values)
    pub fn value_message(&self, value: u8) -> [u8; 3] {
        match *self {
            Self::Note { channel, note } => [0x90 | (channel & 0x0F), note & 0x7F, value & 0x7F],
            Self::CC { channel, cc } => [0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F],
        }
    }

    /// Check if an input event comes from this control
    pub fn matches(&self, event: &MidiInputEvent) -> bool {
        match (self, event) {
            (
                Self::Note { channel, note },
                MidiInputEvent::NoteOn {
                    channel: ec,
                    note: en,
                    ..
                }
                | MidiInputEvent::NoteOff {
                    channel: ec,
                    note: en,
                    ..
                },
            ) => channel == ec && note == en,
            (
                Self::CC { channel, cc },
                MidiInputEvent::ControlChange {
                    channel: ec, cc: en, ..
                },
            ) => channel == ec && cc == en,
            _ => false,
        }
    }
}
