//! Host object model for the APC64 control surface
//!
//! The surface never talks to the DAW directly. Everything it reads or
//! mutates goes through the collaborator traits defined here:
//!
//! - [`Song`]: track list, selection, track creation/duplication/deletion,
//!   per-track monitoring and fold state, device chains
//! - [`Browser`]: the read-only device/preset catalog
//! - [`Host`]: ties both together and owns the `load_item` operation, which
//!   loads a catalog item onto the currently selected track
//!
//! The [`local`] module provides an in-memory implementation used by tests
//! and for running the surface logic headless.

pub mod browser;
pub mod error;
pub mod local;
pub mod song;

pub use browser::{Browser, BrowserCategory, BrowserItem};
pub use error::HostError;
pub use song::{DeviceInfo, FoldState, MonitoringState, Song, TrackId, TrackKind};

/// Combined host handle
///
/// `load_item` mirrors the host browser's fire-and-forget load: the item is
/// loaded onto whichever track is selected when the call is made.
pub trait Host {
    type Song: Song;
    type Browser: Browser;

    fn song(&self) -> &Self::Song;

    fn song_mut(&mut self) -> &mut Self::Song;

    fn browser(&self) -> &Self::Browser;

    /// Load a catalog item onto the selected track
    fn load_item(&mut self, item: &BrowserItem) -> Result<(), HostError>;
}
