use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Weather-provider section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    /// Location query, e.g. a zip code or "lat,lon".
    pub query: String,
    /// How many forecast days to request; two days cover both target times.
    pub forecast_days: u8,
    /// When true, a target time outside the sunrise..sunset window is not
    /// considered runnable.
    pub require_daylight: bool,
    /// Override for the provider base URL (useful for testing).
    pub base_url: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            query: String::new(),
            forecast_days: 2,
            require_daylight: false,
            base_url: None,
        }
    }
}

impl WeatherConfig {
    pub fn require_credentials(&self) -> Result<()> {
        if self.api_key.is_empty() || self.query.is_empty() {
            return Err(anyhow!(
                "No weather API key or location configured.\n\
                 Hint: run `runhub configure` and enter your WeatherAPI.com key and zip code."
            ));
        }
        Ok(())
    }
}

/// Activity-tracker section: the athlete-stats endpoint and its bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ActivityConfig {
    pub api_key: String,
    /// Full URL of the athlete-stats endpoint.
    pub stats_url: String,
}

impl ActivityConfig {
    pub fn require_credentials(&self) -> Result<()> {
        if self.api_key.is_empty() || self.stats_url.is_empty() {
            return Err(anyhow!(
                "No activity API credentials configured.\n\
                 Hint: run `runhub configure` and enter your athlete-stats URL and access token."
            ));
        }
        Ok(())
    }
}

/// Home-automation hub section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the hub's REST API, including any `/api` prefix.
    pub base_url: String,
    pub token: String,
    pub entities: EntityIds,
}

impl HubConfig {
    pub fn require_credentials(&self) -> Result<()> {
        if self.base_url.is_empty() || self.token.is_empty() {
            return Err(anyhow!(
                "No hub URL or access token configured.\n\
                 Hint: run `runhub configure` and enter your hub's API base URL and long-lived token."
            ));
        }
        Ok(())
    }
}

/// Entity ids written on each run. Overridable so the tool can follow an
/// existing dashboard setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityIds {
    pub running_distance: String,
    pub biking_distance: String,
    pub runnable_evening: String,
    pub reason_evening: String,
    pub runnable_morning: String,
    pub reason_morning: String,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self {
            running_distance: "input_number.ytd_running_distance".to_string(),
            biking_distance: "input_number.ytd_biking_distance".to_string(),
            runnable_evening: "input_boolean.runnable_5pm".to_string(),
            reason_evening: "input_text.reason_5pm".to_string(),
            runnable_morning: "input_boolean.runnable_6am".to_string(),
            reason_morning: "input_text.reason_6am".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherConfig,
    pub activity: ActivityConfig,
    pub hub: HubConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "runhub", "runhub")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
