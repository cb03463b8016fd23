//! Forecast API client
//!
//! Integrates with the Open-Meteo forecast endpoint for current conditions,
//! hourly/daily series and past days.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use vitisguard_shared::{
    join_names, CurrentData, CurrentVariable, DailyVariable, HourlyVariable, WeatherLocation,
    WeatherOptions, WeatherResponse,
};

/// Default forecast endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures of a single forecast request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherApiError {
    #[error("Request timeout exceeded")]
    Timeout,

    #[error("HTTP error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("{reason}")]
    Provider { reason: String },

    #[error("{0}")]
    Unknown(String),
}

impl WeatherApiError {
    /// HTTP status, for status errors only
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WeatherApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WeatherApiError::Timeout
        } else {
            WeatherApiError::Unknown(format!("Weather API request failed: {}", error))
        }
    }
}

/// Anything that can produce a forecast for a location
#[async_trait]
pub trait WeatherFetcher: Send + Sync + 'static {
    async fn fetch_weather(
        &self,
        location: &WeatherLocation,
        options: &WeatherOptions,
    ) -> Result<WeatherResponse, WeatherApiError>;
}

/// Provider-side error marker embedded in an otherwise successful body
#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentOnlyResponse {
    current: Option<CurrentData>,
}

/// Forecast API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    /// Create a new WeatherClient against the public endpoint
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch hourly and daily series; empty variable lists are sent empty
    pub async fn fetch(
        &self,
        location: &WeatherLocation,
        options: &WeatherOptions,
    ) -> Result<WeatherResponse, WeatherApiError> {
        let query = vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("hourly", options.hourly_param()),
            ("daily", options.daily_param()),
            ("timezone", "UTC".to_string()),
            ("forecast_days", options.forecast_days.to_string()),
            ("past_days", options.past_days.to_string()),
        ];
        self.request(&query).await
    }

    /// Fetch only the current-conditions block; no variables means all of them
    pub async fn fetch_current(
        &self,
        location: &WeatherLocation,
        variables: &[CurrentVariable],
    ) -> Result<CurrentData, WeatherApiError> {
        let variables = if variables.is_empty() {
            CurrentVariable::ALL
        } else {
            variables
        };
        let query = vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", join_names(variables.iter().map(|v| v.as_str()))),
            ("timezone", "UTC".to_string()),
        ];

        let response: CurrentOnlyResponse = self.request(&query).await?;
        response
            .current
            .ok_or_else(|| WeatherApiError::Unknown("Response has no current block".to_string()))
    }

    /// Fetch current conditions plus hourly and daily series.
    ///
    /// Empty variable lists default to every recognized variable.
    pub async fn fetch_full(
        &self,
        location: &WeatherLocation,
        options: &WeatherOptions,
    ) -> Result<WeatherResponse, WeatherApiError> {
        let hourly = if options.hourly.is_empty() {
            HourlyVariable::ALL
        } else {
            options.hourly.as_slice()
        };
        let daily = if options.daily.is_empty() {
            DailyVariable::ALL
        } else {
            options.daily.as_slice()
        };

        let query = vec![
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            (
                "current",
                join_names(CurrentVariable::ALL.iter().map(|v| v.as_str())),
            ),
            ("hourly", join_names(hourly.iter().map(|v| v.as_str()))),
            ("daily", join_names(daily.iter().map(|v| v.as_str()))),
            ("timezone", "UTC".to_string()),
            ("forecast_days", options.forecast_days.to_string()),
            ("past_days", options.past_days.to_string()),
        ];
        self.request(&query).await
    }

    /// Issue one GET bounded by the client timeout.
    ///
    /// The timer is dropped with the future on every exit path.
    async fn request<T: DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, WeatherApiError> {
        tracing::debug!(url = %self.base_url, "Requesting forecast");
        match tokio::time::timeout(self.timeout, self.send(query)).await {
            Ok(result) => result,
            Err(_) => Err(WeatherApiError::Timeout),
        }
    }

    async fn send<T: DeserializeOwned>(&self, query: &[(&str, String)]) -> Result<T, WeatherApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .map_err(WeatherApiError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherApiError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                WeatherApiError::Timeout
            } else {
                WeatherApiError::Unknown(format!("Failed to parse weather response: {}", e))
            }
        })?;

        if let Ok(ProviderError { error: true, reason }) =
            ProviderError::deserialize(&body)
        {
            return Err(WeatherApiError::Provider {
                reason: reason.unwrap_or_else(|| "API returned error".to_string()),
            });
        }

        serde_json::from_value(body)
            .map_err(|e| WeatherApiError::Unknown(format!("Failed to parse weather response: {}", e)))
    }
}

#[async_trait]
impl WeatherFetcher for WeatherClient {
    async fn fetch_weather(
        &self,
        location: &WeatherLocation,
        options: &WeatherOptions,
    ) -> Result<WeatherResponse, WeatherApiError> {
        self.fetch_full(location, options).await
    }
}
