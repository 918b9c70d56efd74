use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::CardKind;

/// Placement thresholds for one card kind. These are empirically tuned,
/// not derived; keep them in config so they can be adjusted per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselTuning {
    /// Slots fully visible at once.
    pub capacity: usize,
    /// Slot the selected card settles on in steady state (0-based).
    pub center_slot: usize,
    /// Highest index that still keeps the row left-anchored.
    pub start_pin_last_index: usize,
    /// Selections this close to the end pin the row to its end.
    pub end_pin_margin: usize,
}

impl CarouselTuning {
    pub const fn media() -> Self {
        Self {
            capacity: 6,
            center_slot: 4,
            start_pin_last_index: 2,
            end_pin_margin: 2,
        }
    }

    pub const fn category() -> Self {
        Self {
            capacity: 4,
            center_slot: 2,
            start_pin_last_index: 1,
            end_pin_margin: 2,
        }
    }
}

impl Default for CarouselTuning {
    fn default() -> Self {
        Self::media()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub media: CarouselTuning,
    pub category: CarouselTuning,
    pub debounce_ms: u64,
    pub animation_min_ms: u64,
    pub animation_max_ms: u64,
    pub animation_ms_per_item: u64,
    pub discovery_columns: usize,
    pub browse_columns: usize,
    pub repeat_delay_ms: u64,
    pub repeat_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            media: CarouselTuning::media(),
            category: CarouselTuning::category(),
            debounce_ms: 200,
            animation_min_ms: 300,
            animation_max_ms: 600,
            animation_ms_per_item: 60,
            discovery_columns: 6,
            browse_columns: 6,
            repeat_delay_ms: 400,
            repeat_interval_ms: 100,
        }
    }
}

impl EngineConfig {
    pub fn tuning(&self, kind: CardKind) -> CarouselTuning {
        match kind {
            CardKind::Media => self.media,
            CardKind::Category => self.category,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Animation length for a scroll of `distance` items, clamped to the
    /// configured floor and ceiling.
    pub fn animation_duration(&self, distance: usize) -> Duration {
        let raw = self
            .animation_min_ms
            .saturating_add(self.animation_ms_per_item.saturating_mul(distance as u64));
        let ceiling = self.animation_max_ms.max(self.animation_min_ms);
        Duration::from_millis(raw.clamp(self.animation_min_ms, ceiling))
    }
}

/// Returns the project directories for this application.
pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "seerr-tv", "seerr-tv")
        .context("Could not determine project directories")
}

pub fn config_path() -> Result<PathBuf> {
    let proj_dirs = project_dirs()?;
    let config_dir = proj_dirs.config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }
    Ok(config_dir.join("config.json"))
}

/// Load engine configuration from the default location.
pub fn load_config() -> Result<EngineConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = fs::read_to_string(path).context("Failed to read config file")?;
    serde_json::from_str(&content).context("Failed to parse config file")
}

pub fn save_config(config: &EngineConfig, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "debounce_ms": 150, "media": { "capacity": 7 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.media.capacity, 7);
        // Unspecified tuning fields fall back to the media defaults
        assert_eq!(config.media.center_slot, 4);
        assert_eq!(config.category, CarouselTuning::category());
        assert_eq!(config.animation_max_ms, 600);
    }

    #[test]
    fn test_animation_duration_is_clamped() {
        let config = EngineConfig::default();
        assert_eq!(config.animation_duration(0), Duration::from_millis(300));
        assert_eq!(config.animation_duration(2), Duration::from_millis(420));
        assert_eq!(config.animation_duration(40), Duration::from_millis(600));
    }

    #[test]
    fn test_tuning_by_card_kind() {
        let config = EngineConfig::default();
        assert_eq!(config.tuning(CardKind::Media).capacity, 6);
        assert_eq!(config.tuning(CardKind::Category).capacity, 4);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("seerr-tv-missing-config-test.json");
        let _ = fs::remove_file(&path);
        let config = load_config_from(&path).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "seerr-tv-config-test-{}.json",
            std::process::id()
        ));
        let mut config = EngineConfig::default();
        config.discovery_columns = 4;

        save_config(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
