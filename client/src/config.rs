//! Configuration management for the VitisGuard client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with VITIS_ prefix

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use vitisguard_shared::{validate_weather_options, DailyVariable, HourlyVariable, WeatherOptions};

use crate::external::weather::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::services::FetchPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Forecast provider configuration
    pub weather: WeatherConfig,

    /// Retry and polling configuration
    pub fetch: FetchConfig,

    /// Local persistence configuration
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Forecast endpoint
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub forecast_days: u32,

    /// Look-back window; feeds the dry-streak count
    pub past_days: u32,

    /// Hourly variable names; empty means every recognized variable
    #[serde(default)]
    pub hourly: Vec<String>,

    /// Daily variable names; empty means every recognized variable
    #[serde(default)]
    pub daily: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the persisted parcels
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("VITIS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("weather.base_url", DEFAULT_BASE_URL)?
            .set_default("weather.timeout_secs", DEFAULT_TIMEOUT.as_secs())?
            .set_default("weather.forecast_days", 7)?
            .set_default("weather.past_days", 14)?
            .set_default("weather.hourly", Vec::<String>::new())?
            .set_default("weather.daily", Vec::<String>::new())?
            .set_default("fetch.retry_attempts", 3)?
            .set_default("fetch.retry_delay_ms", 1000)?
            .set_default("fetch.poll_interval_secs", 60)?
            .set_default("storage.data_dir", ".vitisguard")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (VITIS_ prefix)
            .add_source(
                Environment::with_prefix("VITIS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("weather.hourly")
                    .with_list_parse_key("weather.daily")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Retry and polling policy for the orchestrator
    pub fn fetch_policy(&self) -> Result<FetchPolicy, ConfigError> {
        if self.fetch.poll_interval_secs == 0 {
            return Err(ConfigError::Message(
                "fetch.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(FetchPolicy {
            retry_attempts: self.fetch.retry_attempts,
            retry_delay: Duration::from_millis(self.fetch.retry_delay_ms),
            poll_interval: Duration::from_secs(self.fetch.poll_interval_secs),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.timeout_secs)
    }

    /// Typed request options; unknown variable names are rejected
    pub fn weather_options(&self) -> Result<WeatherOptions, ConfigError> {
        let hourly = self
            .weather
            .hourly
            .iter()
            .map(|name| name.parse::<HourlyVariable>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Message(format!("weather.hourly: {}", e)))?;
        let daily = self
            .weather
            .daily
            .iter()
            .map(|name| name.parse::<DailyVariable>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::Message(format!("weather.daily: {}", e)))?;

        let options = WeatherOptions {
            hourly,
            daily,
            forecast_days: self.weather.forecast_days,
            past_days: self.weather.past_days,
        };
        validate_weather_options(&options)
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(options)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            weather: WeatherConfig::default(),
            fetch: FetchConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            forecast_days: 7,
            past_days: 14,
            hourly: Vec::new(),
            daily: Vec::new(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay_ms: 1000,
            poll_interval_secs: 60,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".vitisguard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_orchestrator_defaults() {
        let config = Config::default();
        assert_eq!(config.fetch_policy().unwrap(), FetchPolicy::default());
        assert_eq!(config.request_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_weather_options_parse_names() {
        let mut config = Config::default();
        config.weather.hourly = vec!["soil_moisture_0_to_7cm".to_string()];
        config.weather.daily = vec!["precipitation_sum".to_string()];

        let options = config.weather_options().unwrap();
        assert_eq!(options.hourly, vec![HourlyVariable::SoilMoisture0To7cm]);
        assert_eq!(options.daily, vec![DailyVariable::PrecipitationSum]);
        assert_eq!(options.past_days, 14);
    }

    #[test]
    fn test_unknown_variable_is_a_config_error() {
        let mut config = Config::default();
        config.weather.hourly = vec!["leaf_wetness".to_string()];
        assert!(config.weather_options().is_err());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut config = Config::default();
        config.fetch.poll_interval_secs = 0;
        assert!(config.fetch_policy().is_err());
    }
}
