//! Configuration file support for Nutriwatch.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nutriwatch/config.toml`.
//! Every field has a default, so a partial (or missing) file is fine.
//!
//! ```toml
//! default_profile = "me"
//!
//! [data]
//! data_dir = "/home/me/.local/share/nutriwatch"
//!
//! [store]
//! lock_timeout_ms = 5000
//!
//! [analysis]
//! assumes_prior_deficiency = false
//!
//! [profiles.me]
//! demographic = "adult_female"
//! ```

use crate::{DemographicGroup, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Demographic used for profiles without their own setting
pub const DEFAULT_DEMOGRAPHIC: DemographicGroup = DemographicGroup::AdultFemale;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_profile")]
    pub default_profile: String,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            data: DataConfig::default(),
            store: StoreConfig::default(),
            analysis: AnalysisConfig::default(),
            profiles: BTreeMap::new(),
        }
    }
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

/// Journal locking configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Analysis defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    /// Fast-track slow-depleting nutrients unless overridden per run
    #[serde(default)]
    pub assumes_prior_deficiency: bool,
}

/// Per-profile settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileConfig {
    #[serde(default = "default_demographic")]
    pub demographic: DemographicGroup,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            demographic: default_demographic(),
        }
    }
}

// Default value functions
fn default_profile() -> String {
    "default".into()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nutriwatch")
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_demographic() -> DemographicGroup {
    DEFAULT_DEMOGRAPHIC
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
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nutriwatch")
            .join("config.toml")
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

    fn validate(&self) -> Result<()> {
        if self.default_profile.trim().is_empty() {
            return Err(Error::Config("default_profile must not be empty".into()));
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(Error::Config("store.lock_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Settings for a profile, falling back to defaults for unknown names
    pub fn profile(&self, name: &str) -> ProfileConfig {
        self.profiles.get(name).cloned().unwrap_or_default()
    }

    /// Demographic for a profile
    pub fn demographic_for(&self, name: &str) -> DemographicGroup {
        self.profile(name).demographic
    }
}
