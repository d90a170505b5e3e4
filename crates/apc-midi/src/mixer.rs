//! Mixer with the target-track channel strip
//!
//! The target strip follows the selected track and adds three behaviours on
//! top of a plain channel strip:
//!
//! - **Send cycling**: its send controls are a window over the track's sends,
//!   moved by [`MixerComponent::cycle_send_index`]
//! - **Duplicate / delete**: releasing select while the duplicate button is
//!   held duplicates the track; while the clear button is held it deletes it
//! - **Double click**: toggles fold on group tracks, otherwise cycles input
//!   monitoring on armable tracks
//!
//! The duplicate and clear buttons belong to the mixer; the strip only reads
//! their pressed state.

use crate::config::SurfaceConfig;
use crate::gesture::{ClickDetector, SelectGesture};
use crate::send_index::{send_window, SendIndexManager, TARGET_STRIP_RANGE};
use crate::types::MidiAddress;
use apc_core::{FoldState, HostError, MonitoringState, Song, TrackId};
use std::time::Instant;

/// Name of the duplicate modifier on the controller
pub const DUPLICATE_BUTTON_NAME: &str = "Duplicate_Button";

/// Name of the clear modifier on the controller
pub const CLEAR_BUTTON_NAME: &str = "Clear_Button";

/// Error type for mixer wiring
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MixerError {
    #[error("Button '{0}' is not momentary")]
    NotMomentary(String),
}

/// A physical button with its pressed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonElement {
    name: String,
    address: MidiAddress,
    momentary: bool,
    pressed: bool,
}

impl ButtonElement {
    /// Create a momentary button
    pub fn new(name: impl Into<String>, address: MidiAddress) -> Self {
        Self {
            name: name.into(),
            address,
            momentary: true,
            pressed: false,
        }
    }

    /// Mark as a toggle (latching) button
    pub fn toggle(mut self) -> Self {
        self.momentary = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> MidiAddress {
        self.address
    }

    pub fn is_momentary(&self) -> bool {
        self.momentary
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }
}

/// What a select gesture did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripAction {
    DuplicatedTrack {
        source: TrackId,
        copy: TrackId,
        /// Monitoring on the copy was switched from In to Off
        monitoring_reset: bool,
    },
    DeletedTrack(TrackId),
    ToggledFold(TrackId, FoldState),
    CycledMonitoring(TrackId, MonitoringState),
}

/// Channel strip bound to the selected track
#[derive(Debug, Clone)]
pub struct TargetStrip {
    track: Option<TrackId>,
    range_name: String,
    /// Physical send controls, in order
    send_controls: Vec<MidiAddress>,
    /// Send slot → control after applying the send offset
    visible_sends: Vec<Option<MidiAddress>>,
    select: ClickDetector,
}

impl TargetStrip {
    pub fn new(range_name: impl Into<String>, select: ClickDetector) -> Self {
        Self {
            track: None,
            range_name: range_name.into(),
            send_controls: Vec::new(),
            visible_sends: Vec::new(),
            select,
        }
    }

    pub fn track(&self) -> Option<TrackId> {
        self.track
    }

    pub fn set_track(&mut self, track: Option<TrackId>) {
        if self.track != track {
            log::debug!("target strip: track {:?} -> {:?}", self.track, track);
            self.track = track;
        }
    }

    pub fn range_name(&self) -> &str {
        &self.range_name
    }

    pub fn set_send_controls(&mut self, controls: Vec<MidiAddress>, send_index: usize) {
        self.send_controls = controls;
        self.update_send_controls(send_index);
    }

    /// Recompute the visible window for a send offset
    pub fn update_send_controls(&mut self, send_index: usize) {
        self.visible_sends = send_window(&self.send_controls, send_index);
    }

    /// Visible send slots; `None` slots have no control
    pub fn send_controls(&self) -> &[Option<MidiAddress>] {
        &self.visible_sends
    }

    pub fn control_for_send(&self, send: usize) -> Option<MidiAddress> {
        self.visible_sends.get(send).copied().flatten()
    }

    /// Send index a physical control currently drives
    pub fn send_for_control(&self, control: &MidiAddress) -> Option<usize> {
        self.visible_sends
            .iter()
            .position(|slot| slot.as_ref() == Some(control))
    }

    /// Handle "select released immediately"
    ///
    /// Duplicate wins when both modifiers are held. Returns `None` when no
    /// modifier is held or the strip has no track.
    pub fn duplicate_or_delete_track<S: Song>(
        &self,
        song: &mut S,
        duplicate_held: bool,
        clear_held: bool,
    ) -> Result<Option<StripAction>, HostError> {
        let Some(track) = self.track else {
            return Ok(None);
        };

        if duplicate_held {
            let index = song
                .track_index(track)
                .ok_or(HostError::TrackNotFound(track))?;
            song.duplicate_track(index)?;

            // The host selects the copy; keep its input monitoring from jumping in
            let copy = song.selected_track().ok_or(HostError::NoSelectedTrack)?;
            let monitoring_reset = song.can_be_armed(copy)?
                && song.monitoring_state(copy)? == MonitoringState::In;
            if monitoring_reset {
                song.set_monitoring_state(copy, MonitoringState::Off)?;
            }

            log::info!("target strip: duplicated track {} as {}", track, copy);
            Ok(Some(StripAction::DuplicatedTrack {
                source: track,
                copy,
                monitoring_reset,
            }))
        } else if clear_held {
            let index = song
                .track_index(track)
                .ok_or(HostError::TrackNotFound(track))?;
            song.delete_track(index)?;
            log::info!("target strip: deleted track {}", track);
            Ok(Some(StripAction::DeletedTrack(track)))
        } else {
            Ok(None)
        }
    }

    /// Handle "select double-clicked"
    ///
    /// Master and return tracks are neither foldable nor armable and are left alone.
    pub fn cycle_monitoring_or_fold_state<S: Song>(
        &self,
        song: &mut S,
    ) -> Result<Option<StripAction>, HostError> {
        let Some(track) = self.track else {
            return Ok(None);
        };

        if song.is_foldable(track)? {
            let state = song.fold_state(track)?.toggle();
            song.set_fold_state(track, state)?;
            Ok(Some(StripAction::ToggledFold(track, state)))
        } else if song.can_be_armed(track)? {
            let state = song.monitoring_state(track)?.next();
            song.set_monitoring_state(track, state)?;
            Ok(Some(StripAction::CycledMonitoring(track, state)))
        } else {
            Ok(None)
        }
    }
}

/// Mixer owning the modifier buttons, the send index and the target strip
#[derive(Debug, Clone)]
pub struct MixerComponent {
    duplicate_button: Option<ButtonElement>,
    clear_button: Option<ButtonElement>,
    send_index: SendIndexManager,
    target_strip: TargetStrip,
}

impl MixerComponent {
    pub fn new(
        duplicate_button: Option<ButtonElement>,
        clear_button: Option<ButtonElement>,
        config: &SurfaceConfig,
    ) -> Result<Self, MixerError> {
        let mut mixer = Self {
            duplicate_button: None,
            clear_button: None,
            send_index: SendIndexManager::new(config.cycle_size()),
            target_strip: Self::create_target_strip(config),
        };
        mixer.set_duplicate_button(duplicate_button)?;
        mixer.set_clear_button(clear_button)?;
        Ok(mixer)
    }

    fn create_target_strip(config: &SurfaceConfig) -> TargetStrip {
        TargetStrip::new(
            TARGET_STRIP_RANGE,
            ClickDetector::new(config.double_click_window(), config.long_press_threshold()),
        )
    }

    fn check_momentary(button: &Option<ButtonElement>) -> Result<(), MixerError> {
        match button {
            Some(b) if !b.is_momentary() => Err(MixerError::NotMomentary(b.name().to_string())),
            _ => Ok(()),
        }
    }

    pub fn set_duplicate_button(
        &mut self,
        button: Option<ButtonElement>,
    ) -> Result<(), MixerError> {
        Self::check_momentary(&button)?;
        self.duplicate_button = button;
        Ok(())
    }

    pub fn set_clear_button(&mut self, button: Option<ButtonElement>) -> Result<(), MixerError> {
        Self::check_momentary(&button)?;
        self.clear_button = button;
        Ok(())
    }

    pub fn duplicate_button(&self) -> Option<&ButtonElement> {
        self.duplicate_button.as_ref()
    }

    pub fn clear_button(&self) -> Option<&ButtonElement> {
        self.clear_button.as_ref()
    }

    /// Update a modifier's pressed state if `address` is one of them
    ///
    /// Returns true if the event was consumed.
    pub fn on_modifier(&mut self, address: &MidiAddress, pressed: bool) -> bool {
        for button in [&mut self.duplicate_button, &mut self.clear_button]
            .into_iter()
            .flatten()
        {
            if button.address() == *address {
                button.set_pressed(pressed);
                return true;
            }
        }
        false
    }

    fn duplicate_held(&self) -> bool {
        self.duplicate_button.as_ref().is_some_and(|b| b.is_pressed())
    }

    fn clear_held(&self) -> bool {
        self.clear_button.as_ref().is_some_and(|b| b.is_pressed())
    }

    pub fn target_strip(&self) -> &TargetStrip {
        &self.target_strip
    }

    /// Assign the target strip's physical send controls
    pub fn set_target_track_send_controls(&mut self, controls: Vec<MidiAddress>) {
        let index = self.send_index.send_index(self.target_strip.range_name());
        self.target_strip.set_send_controls(controls, index);
    }

    pub fn send_index(&self, range_name: &str) -> usize {
        self.send_index.send_index(range_name)
    }

    /// Advance a range's send offset and refresh strips bound to it
    pub fn cycle_send_index(&mut self, range_name: &str) -> usize {
        let index = self.send_index.cycle_send_index(range_name);
        if self.target_strip.range_name() == range_name {
            self.target_strip.update_send_controls(index);
        }
        index
    }

    /// Advance the target strip's own send range
    pub fn cycle_target_send_index(&mut self) -> usize {
        let range = self.target_strip.range_name().to_string();
        self.cycle_send_index(&range)
    }

    /// Rebind the target strip to the song's selected track
    pub fn on_selected_track_changed<S: Song>(&mut self, song: &S) {
        self.target_strip.set_track(song.selected_track());
    }

    /// Handle the target strip's select button
    ///
    /// A press selects the strip's track and may complete a double click; a
    /// short release runs the duplicate/delete gesture.
    pub fn on_target_select<S: Song>(
        &mut self,
        song: &mut S,
        pressed: bool,
        now: Instant,
    ) -> Result<Option<StripAction>, HostError> {
        let gesture = if pressed {
            if let Some(track) = self.target_strip.track() {
                song.select_track(track)?;
            }
            self.target_strip.select.press(now)
        } else {
            self.target_strip.select.release(now)
        };

        let action = match gesture {
            Some(SelectGesture::ReleasedImmediately) => self.target_strip.duplicate_or_delete_track(
                song,
                self.duplicate_held(),
                self.clear_held(),
            )?,
            Some(SelectGesture::DoubleClicked) => {
                self.target_strip.cycle_monitoring_or_fold_state(song)?
            }
            None => None,
        };

        if action.is_some() {
            self.on_selected_track_changed(song);
        }
        Ok(action)
    }
}
