//! Main APC64 surface
//!
//! Wires the controller's named buttons into the mixer and reacts to pad-mode
//! and drum-group changes. Element values go out through a [`LedSink`].

use crate::config::SurfaceConfig;
use crate::feedback::LedSink;
use crate::input::MidiInputEvent;
use crate::mixer::{
    ButtonElement, MixerComponent, StripAction, CLEAR_BUTTON_NAME, DUPLICATE_BUTTON_NAME,
};
use crate::types::MidiAddress;
use crate::SurfaceError;
use apc_core::Song;
use std::time::Instant;

/// Select button of the target-track strip
pub const TARGET_SELECT_BUTTON_NAME: &str = "Target_Track_Select_Button";

/// Button that cycles the target strip's sends
pub const SEND_CYCLE_BUTTON_NAME: &str = "Send_Cycle_Button";

/// Pad grid mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PadMode {
    #[default]
    Session,
    SessionOverview,
    Note,
    Drum,
}

impl PadMode {
    fn is_session(self) -> bool {
        matches!(self, Self::Session | Self::SessionOverview)
    }
}

/// Physical controls known to the surface
#[derive(Debug, Clone)]
pub struct SurfaceElements {
    /// Named buttons, searched by [`Apc64Surface::find_button`]
    pub controls: Vec<ButtonElement>,
    /// Element telling the controller whether the target track has a drum rack
    pub track_type_element: MidiAddress,
    /// Knobs driving the target strip's sends
    pub send_controls: Vec<MidiAddress>,
}

pub struct Apc64Surface<S: LedSink> {
    config: SurfaceConfig,
    elements: SurfaceElements,
    output: S,
    mixer: Option<MixerComponent>,
    pad_mode: PadMode,
    can_update_controlled_track: bool,
    can_auto_arm: bool,
    refresh_pending: bool,
}

impl<S: LedSink> Apc64Surface<S> {
    pub fn new(config: SurfaceConfig, elements: SurfaceElements, output: S) -> Self {
        Self {
            config,
            elements,
            output,
            mixer: None,
            pad_mode: PadMode::default(),
            can_update_controlled_track: false,
            can_auto_arm: true,
            refresh_pending: false,
        }
    }

    /// First control with the given name
    pub fn find_button(&self, name: &str) -> Option<&ButtonElement> {
        self.elements.controls.iter().find(|c| c.name() == name)
    }

    /// Build the mixer from the named modifier buttons
    ///
    /// Missing modifiers are allowed; their gestures are then unavailable.
    pub fn setup(&mut self) -> Result<(), SurfaceError> {
        let duplicate = self.find_button(DUPLICATE_BUTTON_NAME).cloned();
        let clear = self.find_button(CLEAR_BUTTON_NAME).cloned();
        if duplicate.is_none() || clear.is_none() {
            log::warn!(
                "surface: modifiers missing (duplicate: {}, clear: {})",
                duplicate.is_some(),
                clear.is_some()
            );
        }

        let mut mixer = MixerComponent::new(duplicate, clear, &self.config)?;
        mixer.set_target_track_send_controls(self.elements.send_controls.clone());
        self.mixer = Some(mixer);

        self.on_pad_mode_changed(self.pad_mode);
        log::info!("surface: setup complete");
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.send_track_type(0);
        self.mixer = None;
        log::info!("surface: disconnected");
    }

    pub fn mixer(&self) -> Option<&MixerComponent> {
        self.mixer.as_ref()
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    pub fn pad_mode(&self) -> PadMode {
        self.pad_mode
    }

    pub fn can_update_controlled_track(&self) -> bool {
        self.can_update_controlled_track
    }

    pub fn can_auto_arm(&self) -> bool {
        self.can_auto_arm
    }

    /// Take a pending full-state refresh request
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }

    /// Switch the pad grid mode
    pub fn set_pad_mode(&mut self, mode: PadMode) {
        if self.pad_mode != mode {
            self.pad_mode = mode;
            self.on_pad_mode_changed(mode);
        }
    }

    fn on_pad_mode_changed(&mut self, mode: PadMode) {
        self.can_update_controlled_track = mode == PadMode::Drum;
        if mode.is_session() || mode == PadMode::Drum {
            self.refresh_pending = true;
        }
        self.can_auto_arm = !mode.is_session();
        log::debug!(
            "surface: pad mode {:?} (controlled track: {}, auto-arm: {})",
            mode,
            self.can_update_controlled_track,
            self.can_auto_arm
        );
    }

    /// The target track gained or lost a drum rack
    pub fn drum_group_changed(&mut self, has_drum_group: bool) {
        self.send_track_type(u8::from(has_drum_group));
        if self.pad_mode == PadMode::Drum {
            self.set_pad_mode(PadMode::Note);
        }
    }

    fn send_track_type(&mut self, value: u8) {
        let message = self.elements.track_type_element.value_message(value);
        self.output.send(&message);
    }

    /// The song's selection moved
    pub fn selected_track_changed<T: Song>(&mut self, song: &T) {
        if let Some(mixer) = self.mixer.as_mut() {
            mixer.on_selected_track_changed(song);
        }
    }

    fn is_from_button(&self, name: &str, event: &MidiInputEvent) -> bool {
        self.find_button(name).is_some_and(|b| b.address().matches(event))
    }

    /// Route a controller event to the mixer
    pub fn handle_event<T: Song>(
        &mut self,
        song: &mut T,
        event: &MidiInputEvent,
        now: Instant,
    ) -> Result<Option<StripAction>, SurfaceError> {
        let address = MidiAddress::of(event);
        let pressed = event.is_press();
        let is_select = self.is_from_button(TARGET_SELECT_BUTTON_NAME, event);
        let is_send_cycle = self.is_from_button(SEND_CYCLE_BUTTON_NAME, event);

        let Some(mixer) = self.mixer.as_mut() else {
            log::debug!("surface: event before setup ignored: {:?}", event);
            return Ok(None);
        };

        if mixer.on_modifier(&address, pressed) {
            return Ok(None);
        }
        if is_select {
            return Ok(mixer.on_target_select(song, pressed, now)?);
        }
        if is_send_cycle && pressed {
            mixer.cycle_target_send_index();
        }
        Ok(None)
    }
}
