//! Configuration file support for Glyco.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/glyco/config.toml`.

use crate::{Error, Result, ZoomLength};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub zones: ZoneConfig,

    #[serde(default)]
    pub chart: ChartConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Sample aggregation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_threshold_minutes")]
    pub threshold_minutes: i64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            threshold_minutes: default_threshold_minutes(),
        }
    }
}

impl AggregationConfig {
    pub fn threshold(&self) -> Duration {
        Duration::minutes(self.threshold_minutes)
    }
}

/// Reference glucose bands
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneConfig {
    #[serde(default = "default_sweet_low")]
    pub sweet_low: f64,
    #[serde(default = "default_sweet_high")]
    pub sweet_high: f64,
    #[serde(default = "default_perfect_low")]
    pub perfect_low: f64,
    #[serde(default = "default_perfect_high")]
    pub perfect_high: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            sweet_low: default_sweet_low(),
            sweet_high: default_sweet_high(),
            perfect_low: default_perfect_low(),
            perfect_high: default_perfect_high(),
        }
    }
}

/// Chart presentation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Plotted value for markers on a day without glucose readings
    #[serde(default = "default_sweet_low")]
    pub marker_fallback: f64,

    #[serde(default)]
    pub default_zoom: ZoomLength,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            marker_fallback: default_sweet_low(),
            default_zoom: ZoomLength::All,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("glyco")
}

fn default_threshold_minutes() -> i64 {
    30
}

fn default_sweet_low() -> f64 {
    60.0
}

fn default_sweet_high() -> f64 {
    180.0
}

fn default_perfect_low() -> f64 {
    80.0
}

fn default_perfect_high() -> f64 {
    120.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("glyco").join("config.toml")
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.aggregation.threshold_minutes < 0 {
            return Err(Error::Config(format!(
                "aggregation.threshold_minutes must be >= 0, got {}",
                self.aggregation.threshold_minutes
            )));
        }
        let z = &self.zones;
        if z.sweet_low > z.sweet_high || z.perfect_low > z.perfect_high {
            return Err(Error::Config(format!(
                "zone bounds inverted: sweet {}-{}, perfect {}-{}",
                z.sweet_low, z.sweet_high, z.perfect_low, z.perfect_high
            )));
        }
        if !self.chart.marker_fallback.is_finite() {
            return Err(Error::Config("chart.marker_fallback must be finite".into()));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
