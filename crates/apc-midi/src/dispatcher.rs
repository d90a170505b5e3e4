//! Pad press → device placement
//!
//! Maps pad presses to devices through the mapping table loaded at setup.
//! Lookup and host failures are logged here and never propagate further.

use crate::feedback::{LightState, PadLight, Rgb};
use crate::mapping::MappingTable;
use crate::placement::{place, Placement, PlacementError};
use apc_core::Host;

/// Result of handling one pad event
#[derive(Debug)]
pub enum PadOutcome {
    /// Release, or a pad without a mapping
    Ignored,
    Placed(Placement),
    /// Placement was attempted and failed (already logged)
    Failed(PlacementError),
}

/// Dispatches pad presses to the placement policy
#[derive(Debug, Clone)]
pub struct PadDispatcher {
    /// Immutable for the session
    table: MappingTable,
    /// Light shown on a pad after it was handled
    acknowledge: LightState,
}

impl PadDispatcher {
    pub fn new(table: MappingTable) -> Self {
        Self {
            table,
            acknowledge: LightState::On(Rgb::GREY),
        }
    }

    pub fn with_acknowledge_color(mut self, color: Rgb) -> Self {
        self.acknowledge = LightState::On(color);
        self
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// Handle a pad event
    ///
    /// Only presses (velocity > 0) of mapped pads do anything. The pad is set
    /// to the acknowledge light whether or not placement succeeded.
    pub fn on_pad_event<H: Host, L: PadLight>(
        &self,
        host: &mut H,
        lights: &mut L,
        index: u8,
        velocity: u8,
    ) -> PadOutcome {
        if velocity == 0 {
            return PadOutcome::Ignored;
        }
        let Some(mapping) = self.table.get(index) else {
            log::debug!("dispatch: pad {} has no mapping", index);
            return PadOutcome::Ignored;
        };

        log::debug!(
            "dispatch: pad {} -> '{}' / {:?}",
            index,
            mapping.device_name,
            mapping.preset_name
        );

        let outcome = match place(host, &mapping.device_name, mapping.preset_name.as_deref()) {
            Ok(placement) => PadOutcome::Placed(placement),
            Err(e) => {
                log::warn!("dispatch: pad {}: {}", index, e);
                PadOutcome::Failed(e)
            }
        };

        lights.set_light(index, self.acknowledge);
        outcome
    }

    /// Light mapped pads as pending and turn the rest off
    pub fn initialize_lights<L: PadLight>(
        &self,
        lights: &mut L,
        pads: impl IntoIterator<Item = u8>,
    ) {
        for index in pads {
            let state = if self.table.contains(index) {
                LightState::PENDING
            } else {
                LightState::Off
            };
            lights.set_light(index, state);
        }
    }
}
