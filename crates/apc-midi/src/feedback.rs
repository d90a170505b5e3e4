//! Pad LED feedback
//!
//! The APC64 pads take Note On messages on the pad's note number. The channel
//! selects the LED behaviour (solid at full brightness, blinking) and the
//! velocity selects a colour from the controller palette.
//!
//! [`PadLights`] keeps the last state sent to every pad so that only changes
//! go out on the wire.

use midir::MidiOutputConnection;
use std::collections::HashMap;

/// LED channel for solid colour at full brightness
pub const FULL_BRIGHTNESS_LED_CHANNEL: u8 = 6;

/// LED channel for blinking (quarter-note rate)
pub const BLINK_LED_CHANNEL: u8 = 14;

const NOTE_ON: u8 = 0x90;

/// Controller palette colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(u8);

impl Rgb {
    pub const OFF: Rgb = Rgb(0);
    pub const GREY: Rgb = Rgb(2);
    pub const WHITE: Rgb = Rgb(3);
    pub const RED: Rgb = Rgb(5);
    pub const GREEN: Rgb = Rgb(21);

    pub const fn new(midi_value: u8) -> Self {
        Self(midi_value & 0x7F)
    }

    /// Palette index sent as note velocity
    pub const fn midi_value(self) -> u8 {
        self.0
    }
}

/// Velocity used by the host for clip-playing feedback
pub const PLAYING_FEEDBACK_VELOCITY: u8 = Rgb::GREEN.midi_value();

/// Velocity used by the host for clip-recording feedback
pub const RECORDING_FEEDBACK_VELOCITY: u8 = Rgb::RED.midi_value();

/// What a pad LED shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightState {
    #[default]
    Off,
    On(Rgb),
    Blink(Rgb),
}

impl LightState {
    /// Blink state used for pads that have a device assigned but not yet loaded
    pub const PENDING: LightState = LightState::Blink(Rgb::WHITE);

    /// Note On message that puts a pad into this state
    pub fn note_message(self, note: u8) -> [u8; 3] {
        let note = note & 0x7F;
        match self {
            Self::Off => [NOTE_ON | FULL_BRIGHTNESS_LED_CHANNEL, note, 0],
            Self::On(color) => [
                NOTE_ON | FULL_BRIGHTNESS_LED_CHANNEL,
                note,
                color.midi_value(),
            ],
            Self::Blink(color) => [NOTE_ON | BLINK_LED_CHANNEL, note, color.midi_value()],
        }
    }
}

/// Destination for raw LED messages
pub trait LedSink {
    fn send(&mut self, message: &[u8]);
}

/// Buffers messages, used for batching and in tests
impl LedSink for Vec<Vec<u8>> {
    fn send(&mut self, message: &[u8]) {
        self.push(message.to_vec());
    }
}

/// Pad collaborator: something that can light a pad
pub trait PadLight {
    fn set_light(&mut self, index: u8, state: LightState);
}

/// Tracks last-sent LED state per pad
#[derive(Debug, Clone, Default)]
pub struct LightChangeTracker {
    last_states: HashMap<u8, LightState>,
}

impl LightChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a state; returns true if it differs from what was last sent
    pub fn update(&mut self, index: u8, state: LightState) -> bool {
        if self.last_states.get(&index) == Some(&state) {
            false
        } else {
            self.last_states.insert(index, state);
            true
        }
    }

    pub fn get(&self, index: u8) -> Option<LightState> {
        self.last_states.get(&index).copied()
    }

    pub fn clear(&mut self) {
        self.last_states.clear();
    }

    /// All pads that have been lit
    pub fn tracked_pads(&self) -> impl Iterator<Item = u8> + '_ {
        self.last_states.keys().copied()
    }
}

/// Pad grid LEDs over any [`LedSink`]
pub struct PadLights<S: LedSink> {
    sink: S,
    tracker: LightChangeTracker,
}

impl<S: LedSink> PadLights<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            tracker: LightChangeTracker::new(),
        }
    }

    /// Current state of a pad (`Off` if never set)
    pub fn light(&self, index: u8) -> LightState {
        self.tracker.get(index).unwrap_or_default()
    }

    /// Turn every lit pad off and forget tracked state
    pub fn clear_all(&mut self) {
        let mut pads: Vec<u8> = self.tracker.tracked_pads().collect();
        pads.sort_unstable();
        for index in pads {
            if self.tracker.get(index) != Some(LightState::Off) {
                self.sink.send(&LightState::Off.note_message(index));
            }
        }
        self.tracker.clear();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<S: LedSink> PadLight for PadLights<S> {
    fn set_light(&mut self, index: u8, state: LightState) {
        if self.tracker.update(index, state) {
            log::debug!("[LED] pad {} -> {:?}", index, state);
            self.sink.send(&state.note_message(index));
        }
    }
}

/// MIDI output handler for LED feedback
pub struct MidiOutputHandler {
    connection: MidiOutputConnection,
}

impl MidiOutputHandler {
    pub fn new(connection: MidiOutputConnection) -> Self {
        Self { connection }
    }

    /// Close the output port
    pub fn close(self) {
        let _ = self.connection.close();
    }
}

impl LedSink for MidiOutputHandler {
    fn send(&mut self, message: &[u8]) {
        if let Err(e) = self.connection.send(message) {
            log::warn!("MIDI output: Failed to send message: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_change_tracker() {
        let mut tracker = LightChangeTracker::new();

        // First update should always report a change
        assert!(tracker.update(40, LightState::PENDING));

        // Same state is not re-sent
        assert!(!tracker.update(40, LightState::PENDING));

        assert!(tracker.update(40, LightState::On(Rgb::GREY)));
        assert_eq!(tracker.get(40), Some(LightState::On(Rgb::GREY)));
    }

    #[test]
    fn test_note_messages() {
        assert_eq!(LightState::Off.note_message(24), [0x96, 24, 0]);
        assert_eq!(LightState::On(Rgb::GREY).note_message(24), [0x96, 24, 2]);
        assert_eq!(LightState::Blink(Rgb::RED).note_message(87), [0x9E, 87, 5]);
    }

    #[test]
    fn test_pad_lights_only_send_changes() {
        let mut lights = PadLights::new(Vec::<Vec<u8>>::new());

        lights.set_light(30, LightState::PENDING);
        lights.set_light(30, LightState::PENDING);
        lights.set_light(31, LightState::Off);

        assert_eq!(lights.sink().len(), 2);
        assert_eq!(lights.light(30), LightState::PENDING);
        assert_eq!(lights.light(99), LightState::Off);
    }

    #[test]
    fn test_clear_all_turns_lit_pads_off() {
        let mut lights = PadLights::new(Vec::<Vec<u8>>::new());
        lights.set_light(25, LightState::On(Rgb::GREEN));
        lights.set_light(26, LightState::Off);
        lights.sink_mut().clear();

        lights.clear_all();

        assert_eq!(lights.sink().as_slice(), &[vec![0x96, 25, 0]]);
        assert_eq!(lights.light(25), LightState::Off);
    }

    #[test]
    fn test_feedback_velocities() {
        assert_eq!(PLAYING_FEEDBACK_VELOCITY, 21);
        assert_eq!(RECORDING_FEEDBACK_VELOCITY, 5);
        assert_eq!(Rgb::new(200).midi_value(), 200 & 0x7F);
    }
}
