//! APC64 control surface
//!
//! This crate provides:
//! - Pad mapping file loading and pad-press → device placement
//! - Device/preset lookup in the host catalog
//! - The target-track channel strip (send cycling, duplicate/delete, fold/monitoring)
//! - LED feedback for the pad grid
//! - MIDI device connection and input handling via midir/midly
//!
//! # Architecture
//!
//! ```text
//! APC64 → midir callback → flume channel → surface (event thread) → Host traits
//!                                               ↓
//!                                     LedSink (pad lights, element values)
//! ```
//!
//! All host access goes through the [`apc_core`] collaborator traits, so the
//! surfaces run unchanged against the in-memory host in tests.

mod capabilities;
mod config;
mod connection;
mod dispatcher;
mod feedback;
mod gesture;
mod input;
mod mapping;
mod mixer;
mod placement;
mod plugin;
mod resolver;
mod send_index;
mod surface;
mod types;

pub use capabilities::{
    all_pads, capabilities, pad_matrix_identifiers, Capabilities, PortDirection, PortProperty,
    PortSpec, SurfaceVariant, IDENTITY_RESPONSE_ID_BYTES, PRODUCT_ID, VENDOR_ID,
};
pub use config::{
    default_config_path, default_mapping_path, load_surface_config, save_surface_config,
    SurfaceConfig,
};
pub use connection::{MidiConnection, MidiConnectionError};
pub use dispatcher::{PadDispatcher, PadOutcome};
pub use feedback::{
    LedSink, LightChangeTracker, LightState, MidiOutputHandler, PadLight, PadLights, Rgb,
    BLINK_LED_CHANNEL, FULL_BRIGHTNESS_LED_CHANNEL, PLAYING_FEEDBACK_VELOCITY,
    RECORDING_FEEDBACK_VELOCITY,
};
pub use gesture::{ClickDetector, SelectGesture};
pub use input::{MidiInputEvent, MidiInputHandler, PadEvent, PAD_CHANNEL};
pub use mapping::{
    coordinate_to_value, load_mappings, parse_mappings, ConfigError, MappingTable, PadMapping,
    GRID_SIZE, PAD_INDEX_BASE,
};
pub use mixer::{
    ButtonElement, MixerComponent, MixerError, StripAction, TargetStrip, CLEAR_BUTTON_NAME,
    DUPLICATE_BUTTON_NAME,
};
pub use placement::{place, Placement, PlacementError, PresetOutcome};
pub use plugin::{PluginConnection, PluginSurface};
pub use resolver::{
    find_device, find_in_category, find_preset, is_instrument, resolve_device, DeviceKind,
    LookupError, ResolvedDevice, INSTRUMENT_URI_KEYWORDS,
};
pub use send_index::{send_window, SendIndexManager, DEFAULT_CYCLE_SIZE, TARGET_STRIP_RANGE};
pub use surface::{
    Apc64Surface, PadMode, SurfaceElements, SEND_CYCLE_BUTTON_NAME, TARGET_SELECT_BUTTON_NAME,
};
pub use types::MidiAddress;

use apc_core::HostError;

/// Error type for surface setup and event handling
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Pad mapping error: {0}")]
    Config(#[from] ConfigError),

    #[error("MIDI connection error: {0}")]
    Connection(#[from] MidiConnectionError),

    #[error("Mixer error: {0}")]
    Mixer(#[from] MixerError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}
