//! Surface settings schema and loader
//!
//! Settings are stored as YAML next to the pad mapping file.
//! Default location: ~/Ableton/Resources/apc64.yaml

use crate::feedback::Rgb;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root surface configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Pad mapping file (`column:row, device, preset` per line)
    /// Falls back to `default_mapping_path()` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_file: Option<PathBuf>,

    /// Port name substring to match (case-insensitive)
    pub port_match: String,

    /// Number of send positions the strip send window cycles through
    pub send_cycle_size: usize,

    /// Maximum gap between two select presses to count as a double click
    pub double_click_ms: u64,

    /// Select presses held longer than this are not "released immediately"
    pub long_press_ms: u64,

    /// Palette colour shown on a pad after its device was placed
    pub acknowledge_color: u8,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            mapping_file: None,
            port_match: "APC64".to_string(),
            send_cycle_size: 6,
            double_click_ms: 500,
            long_press_ms: 300,
            acknowledge_color: Rgb::GREY.midi_value(),
        }
    }
}

impl SurfaceConfig {
    /// Effective mapping file path
    pub fn mapping_path(&self) -> PathBuf {
        self.mapping_file
            .clone()
            .unwrap_or_else(default_mapping_path)
    }

    /// Send cycle size, never zero
    pub fn cycle_size(&self) -> usize {
        self.send_cycle_size.max(1)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    pub fn long_press_threshold(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

fn resources_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Ableton")
        .join("Resources")
}

/// Get the default settings file path
///
/// Returns: ~/Ableton/Resources/apc64.yaml
pub fn default_config_path() -> PathBuf {
    resources_dir().join("apc64.yaml")
}

/// Get the default pad mapping file path
///
/// Returns: ~/Ableton/Resources/mappings.txt
pub fn default_mapping_path() -> PathBuf {
    resources_dir().join("mappings.txt")
}

/// Load surface configuration from a YAML file
///
/// If the file doesn't exist, returns the defaults.
/// If the file exists but is invalid, logs a warning and returns the defaults.
pub fn load_surface_config(path: &Path) -> SurfaceConfig {
    log::info!("load_surface_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_surface_config: Config file doesn't exist, using defaults");
        return SurfaceConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<SurfaceConfig>(&contents) {
            Ok(config) => {
                log::info!(
                    "load_surface_config: port_match '{}', mapping file {:?}, send cycle {}",
                    config.port_match,
                    config.mapping_path(),
                    config.cycle_size()
                );
                config
            }
            Err(e) => {
                log::warn!("load_surface_config: Failed to parse config: {}", e);
                SurfaceConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_surface_config: Failed to read config file: {}", e);
            SurfaceConfig::default()
        }
    }
}

/// Save surface configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_surface_config(config: &SurfaceConfig, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_surface_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml =
        serde_yaml::to_string(config).context("Failed to serialize surface config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write surface config file: {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SurfaceConfig::default();
        assert_eq!(config.cycle_size(), 6);
        assert_eq!(config.port_match, "APC64");
        assert!(config.mapping_path().ends_with("Ableton/Resources/mappings.txt"));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
mapping_file: "/tmp/pads.txt"
send_cycle_size: 4
double_click_ms: 350
"#;
        let config: SurfaceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.mapping_path(), PathBuf::from("/tmp/pads.txt"));
        assert_eq!(config.cycle_size(), 4);
        assert_eq!(config.double_click_window(), Duration::from_millis(350));
        // Unset fields keep their defaults
        assert_eq!(config.long_press_ms, 300);
        assert_eq!(config.port_match, "APC64");
    }

    #[test]
    fn test_zero_cycle_size_is_clamped() {
        let config: SurfaceConfig = serde_yaml::from_str("send_cycle_size: 0").unwrap();
        assert_eq!(config.cycle_size(), 1);
    }

    #[test]
    fn test_missing_and_invalid_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert_eq!(load_surface_config(&missing), SurfaceConfig::default());

        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "send_cycle_size: [not, a, number]").unwrap();
        assert_eq!(load_surface_config(&broken), SurfaceConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("apc64.yaml");
        let config = SurfaceConfig {
            port_match: "APC64 Port 2".to_string(),
            send_cycle_size: 3,
            ..SurfaceConfig::default()
        };

        save_surface_config(&config, &path).unwrap();
        assert_eq!(load_surface_config(&path), config);
    }
}
