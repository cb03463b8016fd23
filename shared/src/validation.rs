//! Validation utilities for VitisGuard
//!
//! Coordinate and request-window checks applied before anything is persisted
//! or sent to the forecast provider.

use crate::models::WeatherOptions;

// ============================================================================
// Location Validations
// ============================================================================

/// Validate latitude in decimal degrees
pub fn validate_latitude(latitude: f64) -> Result<(), &'static str> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90 degrees");
    }
    Ok(())
}

/// Validate longitude in decimal degrees
pub fn validate_longitude(longitude: f64) -> Result<(), &'static str> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180 degrees");
    }
    Ok(())
}

// ============================================================================
// Forecast Request Validations
// ============================================================================

/// Longest forecast window the provider serves
pub const MAX_FORECAST_DAYS: u32 = 16;

/// Longest look-back window the provider serves
pub const MAX_PAST_DAYS: u32 = 92;

/// Validate the forecast/past day windows of a request
pub fn validate_weather_options(options: &WeatherOptions) -> Result<(), &'static str> {
    if options.forecast_days > MAX_FORECAST_DAYS {
        return Err("Forecast window must be at most 16 days");
    }
    if options.past_days > MAX_PAST_DAYS {
        return Err("Past window must be at most 92 days");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(42.46).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(90.5).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(-2.45).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.1).is_err());
        assert!(validate_longitude(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_weather_options() {
        assert!(validate_weather_options(&WeatherOptions::default()).is_ok());

        let too_long = WeatherOptions {
            forecast_days: 30,
            ..WeatherOptions::default()
        };
        assert!(validate_weather_options(&too_long).is_err());

        let too_far_back = WeatherOptions {
            past_days: 200,
            ..WeatherOptions::default()
        };
        assert!(validate_weather_options(&too_far_back).is_err());
    }
}
