//! Controller identification and port layout
//!
//! The same hardware is exposed twice: the main surface (`APC64`) and the
//! device-loading plugin surface (`APC64_`). Both share vendor/product ids
//! and the port layout.

use crate::mapping::{GRID_SIZE, PAD_INDEX_BASE};

/// USB vendor id
pub const VENDOR_ID: u16 = 2536;

/// USB product id
pub const PRODUCT_ID: u16 = 83;

/// Bytes the controller returns in its identity response
pub const IDENTITY_RESPONSE_ID_BYTES: [u8; 4] = [71, 83, 0, 25];

/// Which of the two surfaces is being described
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceVariant {
    Main,
    Plugin,
}

impl SurfaceVariant {
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Main => "APC64",
            Self::Plugin => "APC64_",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

/// Port property flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortProperty {
    NotesCc,
    Script,
    Hidden,
    Sync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub direction: PortDirection,
    pub properties: &'static [PortProperty],
}

/// Controller id plus its port declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub vendor_id: u16,
    pub product_ids: &'static [u16],
    pub model_names: Vec<&'static str>,
    pub ports: Vec<PortSpec>,
}

const SCRIPT_PORT: &[PortProperty] = &[
    PortProperty::NotesCc,
    PortProperty::Script,
    PortProperty::Hidden,
];

/// Capabilities advertised by a surface variant
pub fn capabilities(variant: SurfaceVariant) -> Capabilities {
    Capabilities {
        vendor_id: VENDOR_ID,
        product_ids: &[PRODUCT_ID],
        model_names: vec![variant.model_name()],
        ports: vec![
            PortSpec {
                direction: PortDirection::Input,
                properties: SCRIPT_PORT,
            },
            PortSpec {
                direction: PortDirection::Output,
                properties: SCRIPT_PORT,
            },
            PortSpec {
                direction: PortDirection::Output,
                properties: &[PortProperty::Sync],
            },
        ],
    }
}

impl Capabilities {
    /// Check a USB id pair against this controller
    pub fn matches_usb(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_ids.contains(&product_id)
    }
}

/// Pad note numbers in matrix order, top row first
///
/// The hardware numbers rows bottom-up, so row 0 of the matrix is 80..=87.
pub fn pad_matrix_identifiers() -> Vec<Vec<u8>> {
    (0..GRID_SIZE)
        .rev()
        .map(|row| {
            (0..GRID_SIZE)
                .map(|column| PAD_INDEX_BASE + row * GRID_SIZE + column)
                .collect()
        })
        .collect()
}

/// Every pad note number, ascending
pub fn all_pads() -> impl Iterator<Item = u8> {
    PAD_INDEX_BASE..PAD_INDEX_BASE + GRID_SIZE * GRID_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_matrix_rows_are_flipped() {
        let matrix = pad_matrix_identifiers();
        assert_eq!(matrix.len(), 8);
        assert_eq!(matrix[0], (80..=87).collect::<Vec<u8>>());
        assert_eq!(matrix[7], (24..=31).collect::<Vec<u8>>());
        assert_eq!(all_pads().count(), 64);
        assert_eq!(all_pads().last(), Some(87));
    }

    #[test]
    fn test_variants_share_hardware_ids() {
        let main = capabilities(SurfaceVariant::Main);
        let plugin = capabilities(SurfaceVariant::Plugin);

        assert!(main.matches_usb(2536, 83));
        assert!(!main.matches_usb(2536, 84));
        assert_eq!(main.ports, plugin.ports);
        assert_eq!(main.ports.len(), 3);
        assert_eq!(plugin.model_names, vec!["APC64_"]);
    }
}
