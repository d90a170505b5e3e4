//! Track placement for pad-assigned devices
//!
//! Instruments get a new MIDI track at the end of the song; effects go onto
//! the selected track. After the device is loaded, the optional preset is
//! looked up and loaded onto the same track.
//!
//! The host's load operation does not hand back the device it created, so the
//! last device in the target track's chain is taken to be the one just loaded.

use crate::resolver::{find_preset, resolve_device, DeviceKind, LookupError};
use apc_core::{BrowserItem, DeviceInfo, Host, HostError, Song, TrackId};

/// What happened to the requested preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetOutcome {
    /// No preset was configured for the pad
    NotRequested,
    /// Loaded the catalog item with this name
    Loaded(String),
    /// No catalog item matched the preset name
    NotFound,
    /// The device load left no device on the track, preset not attempted
    Skipped,
    /// The host refused to load the preset
    Failed(HostError),
}

/// Result of a successful placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Track the device went onto
    pub track: TrackId,
    pub kind: DeviceKind,
    /// Last device of the track's chain after loading
    pub device: Option<DeviceInfo>,
    pub preset: PresetOutcome,
}

/// Placement failures (device placement did not happen)
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Place a device (and optionally a preset) according to its kind
pub fn place<H: Host>(
    host: &mut H,
    device_name: &str,
    preset_name: Option<&str>,
) -> Result<Placement, PlacementError> {
    let resolved = resolve_device(host.browser(), device_name)?;

    let track = match resolved.kind {
        DeviceKind::Instrument => host.song_mut().create_midi_track(None)?,
        DeviceKind::Effect => host
            .song()
            .selected_track()
            .ok_or(HostError::NoSelectedTrack)?,
    };

    let device = add_device_to_track(host, &resolved.item, track)?;
    log::info!(
        "place: '{}' ({:?}) loaded onto track {}",
        device_name,
        resolved.kind,
        track
    );

    let preset = match preset_name {
        None => PresetOutcome::NotRequested,
        Some(_) if device.is_none() => PresetOutcome::Skipped,
        Some(preset) => load_preset(host, device_name, preset),
    };

    Ok(Placement {
        track,
        kind: resolved.kind,
        device,
        preset,
    })
}

fn add_device_to_track<H: Host>(
    host: &mut H,
    item: &BrowserItem,
    track: TrackId,
) -> Result<Option<DeviceInfo>, HostError> {
    host.song_mut().select_track(track)?;
    host.load_item(item)?;
    Ok(host.song().devices(track)?.last().cloned())
}

fn load_preset<H: Host>(host: &mut H, device_name: &str, preset_name: &str) -> PresetOutcome {
    let Some(item) = find_preset(host.browser(), preset_name).cloned() else {
        log::warn!(
            "{}",
            LookupError::PresetNotFound {
                preset: preset_name.to_string(),
                device: device_name.to_string(),
            }
        );
        return PresetOutcome::NotFound;
    };

    match host.load_item(&item) {
        Ok(()) => {
            log::info!("place: preset '{}' loaded for '{}'", item.name, device_name);
            PresetOutcome::Loaded(item.name)
        }
        Err(e) => {
            log::warn!("place: failed to load preset '{}': {}", item.name, e);
            PresetOutcome::Failed(e)
        }
    }
}
