//! Pad mapping file loader
//!
//! The mapping file assigns a device (and optionally a preset) to a pad of the
//! 8x8 grid, one record per line:
//!
//! ```text
//! column:row, device_name, preset_name
//! 1:8, Wavetable, Basic Shapes
//! 2:8, Reverb,
//! ```
//!
//! Columns and rows are 1-based; row 1 is the top row. The pad index is the
//! note number the pad reports: `24 + (column - 1) + (8 - row) * 8`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Note number of the bottom-left pad
pub const PAD_INDEX_BASE: u8 = 24;

/// Pads per row and rows per grid
pub const GRID_SIZE: u8 = 8;

/// Error type for pad mapping loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read mapping file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: missing {field} (expected 'column:row, device, preset')")]
    MissingField { line: usize, field: &'static str },

    #[error("Line {line}: invalid coordinate '{text}'")]
    InvalidCoordinate { line: usize, text: String },

    #[error("Line {line}: coordinate {column}:{row} is outside the pad grid")]
    OutOfGrid { line: usize, column: i64, row: i64 },
}

/// Convert a 1-based grid coordinate to the pad's note index
///
/// Returns `None` outside the 8x8 grid.
pub fn coordinate_to_value(column: u8, row: u8) -> Option<u8> {
    if !(1..=GRID_SIZE).contains(&column) || !(1..=GRID_SIZE).contains(&row) {
        return None;
    }
    Some(PAD_INDEX_BASE + (column - 1) + (GRID_SIZE - row) * GRID_SIZE)
}

/// Device (and optional preset) assigned to a pad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadMapping {
    pub device_name: String,
    pub preset_name: Option<String>,
}

impl PadMapping {
    pub fn new(device_name: impl Into<String>, preset_name: Option<&str>) -> Self {
        Self {
            device_name: device_name.into(),
            preset_name: preset_name
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        }
    }
}

/// Pad index → mapping lookup table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<u8, PadMapping>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the mapping for a pad (last write wins)
    pub fn insert(&mut self, index: u8, mapping: PadMapping) -> Option<PadMapping> {
        self.entries.insert(index, mapping)
    }

    pub fn get(&self, index: u8) -> Option<&PadMapping> {
        self.entries.get(&index)
    }

    pub fn contains(&self, index: u8) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &PadMapping)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// Parse mapping file contents
///
/// Blank lines and lines starting with `#` are skipped. Any malformed record
/// fails the whole parse.
pub fn parse_mappings(contents: &str) -> Result<MappingTable, ConfigError> {
    let mut table = MappingTable::new();

    for (i, raw) in contents.lines().enumerate() {
        let line = i + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut parts = text.split(',');
        let coordinate = parts.next().map(str::trim).unwrap_or_default();
        let device = parts
            .next()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(ConfigError::MissingField {
                line,
                field: "device name",
            })?;
        let preset = parts.next().ok_or(ConfigError::MissingField {
            line,
            field: "preset name",
        })?;

        let index = parse_coordinate(coordinate, line)?;
        if let Some(previous) = table.insert(index, PadMapping::new(device, Some(preset))) {
            log::debug!(
                "parse_mappings: line {} replaces '{}' on pad {}",
                line,
                previous.device_name,
                index
            );
        }
    }

    Ok(table)
}

fn parse_coordinate(text: &str, line: usize) -> Result<u8, ConfigError> {
    let invalid = || ConfigError::InvalidCoordinate {
        line,
        text: text.to_string(),
    };

    let (column, row) = text.split_once(':').ok_or_else(invalid)?;
    let column: i64 = column.trim().parse().map_err(|_| invalid())?;
    let row: i64 = row.trim().parse().map_err(|_| invalid())?;

    u8::try_from(column)
        .ok()
        .zip(u8::try_from(row).ok())
        .and_then(|(c, r)| coordinate_to_value(c, r))
        .ok_or(ConfigError::OutOfGrid { line, column, row })
}

/// Load the pad mapping file
pub fn load_mappings(path: &Path) -> Result<MappingTable, ConfigError> {
    log::info!("load_mappings: Loading from {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_mappings(&contents)?;

    log::info!("load_mappings: Loaded {} pad mapping(s)", table.len());
    for (index, mapping) in table.iter() {
        log::debug!(
            "  - pad {}: {} / {}",
            index,
            mapping.device_name,
            mapping.preset_name.as_deref().unwrap_or("-")
        );
    }

    Ok(table)
}
