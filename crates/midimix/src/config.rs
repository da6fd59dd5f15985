//! Driver configuration schema and loader
//!
//! Configuration is stored as YAML in the user's config folder.
//! Default location: ~/.config/midimix/midimix.yaml
//!
//! Every field has a default matching the stock MIDI Mix layout, so an
//! empty or missing file yields a working driver.

use crate::types::{ControllerAddress, ParameterKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base CC number of each physical strip (top knob of the strip)
pub const DEFAULT_TRACK_BASES: [ControllerAddress; 8] =
    [0x10, 0x14, 0x18, 0x1C, 0x2E, 0x32, 0x36, 0x3A];

/// CC number of the master fader
pub const DEFAULT_MASTER_ADDRESS: ControllerAddress = 0x3E;

/// Root driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Port name substring to match (case-insensitive)
    pub port_match: String,

    /// Controller number layout of the surface
    pub layout: LayoutConfig,

    /// Host bank sizing
    pub bank: BankConfig,

    /// What to do when a release leaves other presses pending
    pub overlap_policy: OverlapPolicy,

    /// Where send knobs are routed
    pub send_routing: SendRouting,

    /// Bank paging buttons (disabled when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingConfig>,

    /// Bound of the callback → router channel
    pub channel_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            port_match: "MIDI Mix".to_string(),
            layout: LayoutConfig::default(),
            bank: BankConfig::default(),
            overlap_policy: OverlapPolicy::default(),
            send_routing: SendRouting::default(),
            paging: None,
            channel_capacity: 256,
        }
    }
}

/// Controller number layout
///
/// Each strip occupies `base + offset` for the four parameter offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Base controller number per physical strip, left to right
    pub track_bases: Vec<ControllerAddress>,
    /// Offset added to each base per parameter kind
    pub offsets: ParameterOffsets,
    /// Controller number of the master fader
    pub master_address: ControllerAddress,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            track_bases: DEFAULT_TRACK_BASES.to_vec(),
            offsets: ParameterOffsets::default(),
            master_address: DEFAULT_MASTER_ADDRESS,
        }
    }
}

/// Per-parameter offsets from a strip's base controller number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterOffsets {
    pub send_a: u8,
    pub send_b: u8,
    pub send_c: u8,
    pub volume: u8,
}

impl Default for ParameterOffsets {
    fn default() -> Self {
        Self {
            send_a: 0,
            send_b: 1,
            send_c: 2,
            volume: 3,
        }
    }
}

impl ParameterOffsets {
    /// Get the offset for a parameter kind
    pub fn offset(&self, kind: ParameterKind) -> u8 {
        match kind {
            ParameterKind::SendA => self.send_a,
            ParameterKind::SendB => self.send_b,
            ParameterKind::SendC => self.send_c,
            ParameterKind::Volume => self.volume,
        }
    }
}

/// Host bank sizing
///
/// Mirrors the capacities the host is asked for when the bank is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Number of host tracks reachable by paging
    pub max_tracks: usize,
    /// Number of sends exposed per track
    pub max_sends: usize,
    /// Number of scenes exposed per track
    pub max_scenes: usize,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            max_tracks: 0x10,
            max_sends: 0x03,
            max_scenes: 0x10,
        }
    }
}

/// Recovery policy when a release leaves other presses pending
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Drop all remaining pending presses after reporting
    #[default]
    Reset,
    /// Keep remaining presses pending so later releases can pair with them
    Accumulate,
}

/// Routing of the three send knobs on each strip
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SendRouting {
    /// Every mapped control drives the strip volume
    #[default]
    Volume,
    /// Send knobs drive the matching host send
    Send,
}

/// Bank paging buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Note number of the bank-left button
    pub bank_left: ControllerAddress,
    /// Note number of the bank-right button
    pub bank_right: ControllerAddress,
}

impl Default for PagingConfig {
    fn default() -> Self {
        // BANK LEFT / BANK RIGHT on the MIDI Mix
        Self {
            bank_left: 0x19,
            bank_right: 0x1A,
        }
    }
}

/// Get the default driver config file path
///
/// Returns: <config dir>/midimix/midimix.yaml
pub fn default_driver_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("midimix")
        .join("midimix.yaml")
}

/// Load driver configuration from a YAML file
///
/// If the file doesn't exist, returns the default config.
/// If the file exists but is invalid, logs a warning and returns the default config.
pub fn load_driver_config(path: &Path) -> DriverConfig {
    log::info!("load_driver_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_driver_config: Config file doesn't exist, using defaults");
        return DriverConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<DriverConfig>(&contents) {
            Ok(config) => {
                log::info!(
                    "load_driver_config: Loaded (port_match: '{}', {} tracks, master 0x{:02X})",
                    config.port_match,
                    config.layout.track_bases.len(),
                    config.layout.master_address
                );
                config
            }
            Err(e) => {
                log::warn!("load_driver_config: Failed to parse config: {}", e);
                DriverConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_driver_config: Failed to read config file: {}", e);
            DriverConfig::default()
        }
    }
}

/// Save driver configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_driver_config(config: &DriverConfig, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_driver_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml =
        serde_yaml::to_string(config).context("Failed to serialize driver config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write driver config file: {:?}", path))?;

    log::info!("save_driver_config: Config saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.port_match, "MIDI Mix");
        assert_eq!(config.layout.track_bases, DEFAULT_TRACK_BASES.to_vec());
        assert_eq!(config.layout.master_address, 0x3E);
        assert_eq!(config.overlap_policy, OverlapPolicy::Reset);
        assert_eq!(config.send_routing, SendRouting::Volume);
        assert!(config.paging.is_none());
    }

    #[test]
    fn test_offsets() {
        let offsets = ParameterOffsets::default();
        assert_eq!(offsets.offset(ParameterKind::SendA), 0);
        assert_eq!(offsets.offset(ParameterKind::SendB), 1);
        assert_eq!(offsets.offset(ParameterKind::SendC), 2);
        assert_eq!(offsets.offset(ParameterKind::Volume), 3);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: DriverConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.bank, BankConfig::default());
        assert_eq!(config.channel_capacity, 256);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
port_match: "Mix"
layout:
  track_bases: [0x10, 0x14]
  master_address: 0x20
  offsets:
    volume: 2
    send_c: 3
bank:
  max_tracks: 4
overlap_policy: accumulate
send_routing: send
paging:
  bank_left: 25
  bank_right: 26
"#;

        let config: DriverConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port_match, "Mix");
        assert_eq!(config.layout.track_bases, vec![0x10, 0x14]);
        assert_eq!(config.layout.master_address, 0x20);
        assert_eq!(config.layout.offsets.volume, 2);
        assert_eq!(config.layout.offsets.send_a, 0);
        assert_eq!(config.bank.max_tracks, 4);
        assert_eq!(config.bank.max_sends, 3);
        assert_eq!(config.overlap_policy, OverlapPolicy::Accumulate);
        assert_eq!(config.send_routing, SendRouting::Send);
        assert_eq!(config.paging, Some(PagingConfig::default()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("midimix-config-{}", std::process::id()));
        let path = dir.join("nested").join("midimix.yaml");

        let mut config = DriverConfig::default();
        config.overlap_policy = OverlapPolicy::Accumulate;
        config.paging = Some(PagingConfig::default());
        save_driver_config(&config, &path).unwrap();

        let loaded = load_driver_config(&path);
        assert_eq!(loaded.overlap_policy, OverlapPolicy::Accumulate);
        assert_eq!(loaded.paging, Some(PagingConfig::default()));
        assert_eq!(loaded.layout, config.layout);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let missing = std::env::temp_dir().join("midimix-definitely-missing.yaml");
        assert_eq!(load_driver_config(&missing).port_match, "MIDI Mix");

        let path = std::env::temp_dir().join(format!("midimix-invalid-{}.yaml", std::process::id()));
        std::fs::write(&path, "layout: [not, a, map").unwrap();
        assert_eq!(load_driver_config(&path).layout, LayoutConfig::default());
        let _ = std::fs::remove_file(&path);
    }
}
