//! Error handling for the VitisGuard client
//!
//! Fetch failures keep their own type so the orchestrator can expose the last
//! one as state; everything else funnels into [`AppError`].

use thiserror::Error;
use validator::ValidationErrors;

use crate::external::WeatherApiError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherApiError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Weather(WeatherApiError::Timeout) => "WEATHER_TIMEOUT",
            AppError::Weather(_) => "WEATHER_SERVICE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        // Report the first offending field; schema-level errors use "__all__"
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .unwrap_or_default();
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("unknown".to_string(), errors.to_string()));

        AppError::Validation { field, message }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;
