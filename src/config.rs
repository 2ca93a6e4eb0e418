use crate::error::Result;
use crate::layout::{LayoutConfig, MIN_HEIGHT_PERCENT, MONTH_CELL_MAX_VISIBLE};
use crate::range::Granularity;
use crate::time::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub default_granularity: Granularity,
    #[serde(default = "default_month_cell_max_visible")]
    pub month_cell_max_visible: usize,
    #[serde(default = "default_min_event_height_percent")]
    pub min_event_height_percent: f64,
    #[serde(default = "default_indicator_interval_secs")]
    pub indicator_interval_secs: u64,
    /// Tasks/meetings JSON; `snapshot.json` in the config dir when unset
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_month_cell_max_visible() -> usize {
    MONTH_CELL_MAX_VISIBLE
}

fn default_min_event_height_percent() -> f64 {
    MIN_HEIGHT_PERCENT
}

fn default_indicator_interval_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            default_granularity: Granularity::default(),
            month_cell_max_visible: default_month_cell_max_visible(),
            min_event_height_percent: default_min_event_height_percent(),
            indicator_interval_secs: default_indicator_interval_secs(),
            snapshot_path: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("planboard")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Load from the default location; defaults when the file is missing
    pub fn load() -> Result<Config> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Config> {
        let mut config: Config = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    /// Replace out-of-range values with defaults
    fn sanitize(&mut self) {
        if self.month_cell_max_visible == 0 {
            tracing::warn!("month_cell_max_visible must be positive; using default");
            self.month_cell_max_visible = default_month_cell_max_visible();
        }

        if !self.min_event_height_percent.is_finite()
            || self.min_event_height_percent <= 0.0
            || self.min_event_height_percent > 100.0
        {
            tracing::warn!(
                value = self.min_event_height_percent,
                "min_event_height_percent out of range; using default"
            );
            self.min_event_height_percent = default_min_event_height_percent();
        }

        if self.indicator_interval_secs == 0 {
            tracing::warn!("indicator_interval_secs must be positive; using default");
            self.indicator_interval_secs = default_indicator_interval_secs();
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("snapshot.json"))
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            min_height_percent: self.min_event_height_percent,
            month_cell_max_visible: self.month_cell_max_visible,
        }
    }

    pub fn indicator_interval(&self) -> Duration {
        Duration::from_secs(self.indicator_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.layout(), LayoutConfig::default());
        assert_eq!(config.indicator_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_fields() {
        let json = r#"{
            "locale": "russian",
            "default_granularity": "week",
            "month_cell_max_visible": 4,
            "snapshot_path": "/tmp/plan.json"
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.locale, Locale::Russian);
        assert_eq!(config.default_granularity, Granularity::Week);
        assert_eq!(config.layout().month_cell_max_visible, 4);
        assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/plan.json"));
    }

    #[test]
    fn test_invalid_values_are_sanitized() {
        let json = r#"{
            "month_cell_max_visible": 0,
            "min_event_height_percent": -1.0,
            "indicator_interval_secs": 0
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.month_cell_max_visible, MONTH_CELL_MAX_VISIBLE);
        assert_eq!(config.min_event_height_percent, MIN_HEIGHT_PERCENT);
        assert_eq!(config.indicator_interval_secs, 60);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("planboard-test-missing").join("config.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
