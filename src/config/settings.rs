//! Handler settings
//!
//! Defines all configurable options for ambush, air raid and walk handling.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::vision::Region;

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-map feature switches
    pub map: MapSettings,
    /// Overlay and glyph detection tuning
    pub detection: DetectionSettings,
    /// Sampling and crop regions
    pub regions: RegionSettings,
    /// Interaction timing
    pub timings: TimingSettings,
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Settings for a map where ambushes are evaded
    pub fn evade_preset() -> Self {
        Self {
            map: MapSettings {
                has_ambush: true,
                has_fleet_step: true,
                ambush_mode: AmbushMode::Evade,
            },
            ..Default::default()
        }
    }

    /// Settings for a map where ambushes are fought
    pub fn attack_preset() -> Self {
        Self {
            map: MapSettings {
                has_ambush: true,
                has_fleet_step: true,
                ambush_mode: AmbushMode::Attack,
            },
            ..Default::default()
        }
    }
}

/// How an ambush is resolved once its prompt is up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AmbushMode {
    /// Press evade and read the result from the info bar
    #[default]
    Evade,
    /// Press attack and go straight into combat
    Attack,
}

/// Feature switches of the current map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Whether the map spawns ambushes and air raids
    pub has_ambush: bool,
    /// Whether fleets have a limited step count on this map
    pub has_fleet_step: bool,
    /// Ambush resolution mode
    pub ambush_mode: AmbushMode,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            has_ambush: true,
            has_fleet_step: false,
            ambush_mode: AmbushMode::Evade,
        }
    }
}

/// Detection thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Overlay transparency above which an ambush is on screen
    pub ambush_threshold: f32,
    /// Overlay transparency above which an air raid is on screen
    /// (observed values sit around 0.50 to 0.53)
    pub air_raid_threshold: f32,
    /// How long the air raid overlay must stay away before it counts as over (ms)
    pub air_raid_confirm_ms: u64,
    /// Red channel of a fully opaque overlay
    pub overlay_red: u8,
    /// Minimum normalized correlation for a glyph template match
    pub glyph_similarity: f32,
    /// Per-channel tolerance when comparing a button area to its color
    pub button_color_tolerance: u8,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            ambush_threshold: 0.40,
            air_raid_threshold: 0.35,
            air_raid_confirm_ms: 500,
            overlay_red: 247,
            glyph_similarity: 0.85,
            button_color_tolerance: 10,
        }
    }
}

impl DetectionSettings {
    /// Air raid confirmation window
    pub fn air_raid_confirm(&self) -> Duration {
        Duration::from_millis(self.air_raid_confirm_ms)
    }
}

/// Regions in frame pixels (defaults for a 1280x720 frame)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    /// Area sampled for the ambush overlay
    pub ambush: Region,
    /// Area sampled for the air raid overlay
    pub air_raid: Region,
    /// Area cropped from the info bar for glyph matching
    pub info_bar: Region,
    /// Map color under the ambush area before any overlay
    pub ambush_reference: [u8; 3],
    /// Map color under the air raid area before any overlay
    pub air_raid_reference: [u8; 3],
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            ambush: Region::new(48, 122, 92, 40),
            air_raid: Region::new(1140, 122, 92, 40),
            info_bar: Region::new(475, 78, 330, 36),
            ambush_reference: [74, 99, 115],
            air_raid_reference: [66, 93, 115],
        }
    }
}

/// Timing settings for screen interactions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Minimum gap between two clicks on the attack button (ms)
    pub attack_click_interval_ms: u64,
    /// Upper bound when waiting for a lingering info bar to clear (ms)
    pub info_bar_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            attack_click_interval_ms: 1000,
            info_bar_timeout_ms: 3000,
        }
    }
}

impl TimingSettings {
    pub fn attack_click_interval(&self) -> Duration {
        Duration::from_millis(self.attack_click_interval_ms)
    }

    pub fn info_bar_timeout(&self) -> Duration {
        Duration::from_millis(self.info_bar_timeout_ms)
    }
}

/// Settings loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.map.has_ambush);
        assert!(!settings.map.has_fleet_step);
        assert_eq!(settings.detection.ambush_threshold, 0.40);
        assert_eq!(settings.detection.air_raid_threshold, 0.35);
        assert_eq!(settings.detection.air_raid_confirm(), Duration::from_millis(500));
    }

    #[test]
    fn test_presets() {
        assert_eq!(Settings::evade_preset().map.ambush_mode, AmbushMode::Evade);
        let attack = Settings::attack_preset();
        assert_eq!(attack.map.ambush_mode, AmbushMode::Attack);
        assert!(attack.map.has_fleet_step);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"map": {"ambush_mode": "Attack"}, "detection": {"air_raid_confirm_ms": 800}}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.map.ambush_mode, AmbushMode::Attack);
        assert!(settings.map.has_ambush);
        assert_eq!(settings.detection.air_raid_confirm_ms, 800);
        assert_eq!(settings.detection.ambush_threshold, 0.40);
        assert_eq!(settings.regions.info_bar, Region::new(475, 78, 330, 36));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
