//! Errors reported by host collaborators

use crate::song::TrackId;

/// Error type for operations against the host object model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Track {0} does not exist")]
    TrackNotFound(TrackId),

    #[error("Track index {index} out of range (song has {count} tracks)")]
    InvalidTrackIndex { index: usize, count: usize },

    #[error("No track is selected")]
    NoSelectedTrack,

    #[error("Cannot delete the last remaining track")]
    LastTrack,

    #[error("Track {track} does not support {operation}")]
    Unsupported {
        track: TrackId,
        operation: &'static str,
    },

    #[error("Failed to load browser item '{0}'")]
    LoadFailed(String),
}
