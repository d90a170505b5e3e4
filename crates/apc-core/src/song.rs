//! Song and track collaborator
//!
//! Tracks are addressed by a stable [`TrackId`]. Index-based operations
//! (duplicate, delete) take the track's position in the song, as the host
//! API does; [`Song::track_index`] converts between the two.

use crate::error::HostError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a track in the song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of track, as far as the surface cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    #[default]
    Midi,
    Audio,
    /// Group track (foldable, cannot be armed)
    Group,
    /// Return track (cannot be armed)
    Return,
    /// Master track (cannot be armed)
    Master,
}

impl TrackKind {
    /// Whether tracks of this kind can be record-armed
    ///
    /// Master, return and group tracks are excluded.
    pub fn can_be_armed(&self) -> bool {
        matches!(self, Self::Midi | Self::Audio)
    }

    /// Whether tracks of this kind can be folded
    pub fn is_foldable(&self) -> bool {
        matches!(self, Self::Group)
    }
}

/// Track input monitoring mode
///
/// Discriminants match the host's integer encoding (0=In, 1=Auto, 2=Off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringState {
    In = 0,
    #[default]
    Auto = 1,
    Off = 2,
}

impl MonitoringState {
    /// Next state in the In → Auto → Off → In cycle
    pub fn next(self) -> Self {
        match self {
            Self::In => Self::Auto,
            Self::Auto => Self::Off,
            Self::Off => Self::In,
        }
    }

    /// Host integer value
    pub fn as_index(self) -> u8 {
        self as u8
    }

    /// Convert from the host integer value
    pub fn from_index(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::In),
            1 => Some(Self::Auto),
            2 => Some(Self::Off),
            _ => None,
        }
    }
}

/// Fold state of a group track (0 = unfolded, 1 = folded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldState {
    #[default]
    Unfolded = 0,
    Folded = 1,
}

impl FoldState {
    pub fn toggle(self) -> Self {
        match self {
            Self::Unfolded => Self::Folded,
            Self::Folded => Self::Unfolded,
        }
    }

    pub fn as_index(self) -> u8 {
        self as u8
    }
}

/// A device sitting in a track's device chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Display name
    pub name: String,
    /// Catalog uri the device was loaded from
    pub uri: String,
}

/// Song collaborator: track list, selection and per-track state
pub trait Song {
    /// All tracks in song order (master and returns excluded)
    fn tracks(&self) -> Vec<TrackId>;

    /// Position of a track in song order
    fn track_index(&self, track: TrackId) -> Option<usize>;

    fn selected_track(&self) -> Option<TrackId>;

    fn select_track(&mut self, track: TrackId) -> Result<(), HostError>;

    /// Create a MIDI track at `index`, or at the end when `None`
    fn create_midi_track(&mut self, index: Option<usize>) -> Result<TrackId, HostError>;

    /// Duplicate the track at `index`; the copy is inserted after it and selected
    fn duplicate_track(&mut self, index: usize) -> Result<TrackId, HostError>;

    fn delete_track(&mut self, index: usize) -> Result<(), HostError>;

    fn track_kind(&self, track: TrackId) -> Result<TrackKind, HostError>;

    fn monitoring_state(&self, track: TrackId) -> Result<MonitoringState, HostError>;

    fn set_monitoring_state(
        &mut self,
        track: TrackId,
        state: MonitoringState,
    ) -> Result<(), HostError>;

    fn fold_state(&self, track: TrackId) -> Result<FoldState, HostError>;

    fn set_fold_state(&mut self, track: TrackId, state: FoldState) -> Result<(), HostError>;

    /// Device chain of a track, most recently loaded last
    fn devices(&self, track: TrackId) -> Result<Vec<DeviceInfo>, HostError>;

    fn can_be_armed(&self, track: TrackId) -> Result<bool, HostError> {
        Ok(self.track_kind(track)?.can_be_armed())
    }

    fn is_foldable(&self, track: TrackId) -> Result<bool, HostError> {
        Ok(self.track_kind(track)?.is_foldable())
    }
}
