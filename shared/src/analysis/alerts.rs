//! Severe-weather alert rules
//!
//! Rules are independent: each one reads only the inputs it needs and a
//! missing input suppresses that rule alone.

use chrono::{DateTime, Datelike, Utc};

use crate::models::{advisory_id, WeatherAlert, WeatherAlertType};
use crate::thresholds::{
    alert_config, DROUGHT_CRITICAL_DAYS, DROUGHT_DAYS, DROUGHT_HIGH_DAYS,
    EXCESSIVE_RAIN_PRECIPITATION, EXTREME_HEAT_TEMPERATURE, EXTREME_RAIN_PRECIPITATION,
    FROST_TEMPERATURE, HEATWAVE_TEMPERATURE, LATE_FROST_MONTHS, LATE_FROST_TEMPERATURE,
    SEVERE_FROST_TEMPERATURE, STORM_PRECIPITATION, STORM_WIND_SPEED,
};
use crate::types::RiskLevel;

fn build_alert(
    alert_type: WeatherAlertType,
    level: RiskLevel,
    description: String,
    now: DateTime<Utc>,
) -> WeatherAlert {
    let config = alert_config(alert_type);
    WeatherAlert {
        id: advisory_id(alert_type.as_str()),
        alert_type,
        level,
        title: config.title.to_string(),
        description,
        recommendation: config.recommendations.for_level(level).to_string(),
        detected_at: now,
    }
}

/// Evaluate every alert rule at the given instant.
///
/// `now` drives the late-frost seasonal window, read as a UTC month.
/// Humidity is accepted for parity with the other evaluators; no rule reads
/// it yet.
pub fn generate_weather_alerts(
    temperature: Option<f64>,
    _humidity: Option<f64>,
    precipitation: Option<f64>,
    wind_speed: Option<f64>,
    days_without_rain: u32,
    now: DateTime<Utc>,
) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();

    if let Some(temperature) = temperature {
        if temperature < FROST_TEMPERATURE {
            let level = if temperature < SEVERE_FROST_TEMPERATURE {
                RiskLevel::Critical
            } else {
                RiskLevel::High
            };
            alerts.push(build_alert(
                WeatherAlertType::Frost,
                level,
                format!("Temperatura actual: {}°C", temperature),
                now,
            ));
        }

        if temperature < LATE_FROST_TEMPERATURE && LATE_FROST_MONTHS.contains(&now.month()) {
            let level = if temperature < FROST_TEMPERATURE {
                RiskLevel::Critical
            } else {
                RiskLevel::High
            };
            alerts.push(build_alert(
                WeatherAlertType::LateFrost,
                level,
                format!("Temperatura: {}°C en primavera", temperature),
                now,
            ));
        }

        if temperature > HEATWAVE_TEMPERATURE {
            let level = if temperature > EXTREME_HEAT_TEMPERATURE {
                RiskLevel::Critical
            } else {
                RiskLevel::High
            };
            alerts.push(build_alert(
                WeatherAlertType::Heatwave,
                level,
                format!("Temperatura: {}°C", temperature),
                now,
            ));
        }
    }

    if let (Some(precipitation), Some(wind_speed)) = (precipitation, wind_speed) {
        if precipitation > STORM_PRECIPITATION && wind_speed > STORM_WIND_SPEED {
            alerts.push(build_alert(
                WeatherAlertType::Storm,
                RiskLevel::Critical,
                format!(
                    "Precipitación: {}mm/h, Viento: {}km/h",
                    precipitation, wind_speed
                ),
                now,
            ));
        }
    }

    if days_without_rain >= DROUGHT_DAYS {
        let level = if days_without_rain >= DROUGHT_CRITICAL_DAYS {
            RiskLevel::Critical
        } else if days_without_rain >= DROUGHT_HIGH_DAYS {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };
        alerts.push(build_alert(
            WeatherAlertType::Drought,
            level,
            format!("{} días sin lluvia", days_without_rain),
            now,
        ));
    }

    if let Some(precipitation) = precipitation {
        if precipitation > EXCESSIVE_RAIN_PRECIPITATION {
            let level = if precipitation > EXTREME_RAIN_PRECIPITATION {
                RiskLevel::Critical
            } else {
                RiskLevel::High
            };
            alerts.push(build_alert(
                WeatherAlertType::ExcessiveRain,
                level,
                format!("Precipitación: {}mm en las últimas horas", precipitation),
                now,
            ));
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn july() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    fn april() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 6, 0, 0).unwrap()
    }

    fn find(alerts: &[WeatherAlert], alert_type: WeatherAlertType) -> Option<&WeatherAlert> {
        alerts.iter().find(|a| a.alert_type == alert_type)
    }

    fn temperature_alerts(temperature: f64, now: DateTime<Utc>) -> Vec<WeatherAlert> {
        generate_weather_alerts(Some(temperature), None, None, None, 0, now)
    }

    #[test]
    fn test_frost_levels() {
        let alerts = temperature_alerts(-5.0, july());
        assert_eq!(find(&alerts, WeatherAlertType::Frost).unwrap().level, RiskLevel::High);

        let alerts = temperature_alerts(-6.0, july());
        let frost = find(&alerts, WeatherAlertType::Frost).unwrap();
        assert_eq!(frost.level, RiskLevel::Critical);
        assert_eq!(frost.title, "Helada");
        assert_eq!(frost.description, "Temperatura actual: -6°C");
        assert_eq!(
            frost.recommendation,
            "ALERTA: Cubra las plantas inmediatamente. Riesgo de daños severos."
        );

        assert!(temperature_alerts(0.0, july()).is_empty());
    }

    #[test]
    fn test_late_frost_only_in_spring() {
        let alerts = temperature_alerts(2.0, april());
        let late = find(&alerts, WeatherAlertType::LateFrost).unwrap();
        assert_eq!(late.level, RiskLevel::High);
        assert!(find(&alerts, WeatherAlertType::Frost).is_none());

        let alerts = temperature_alerts(-1.0, april());
        assert_eq!(
            find(&alerts, WeatherAlertType::LateFrost).unwrap().level,
            RiskLevel::Critical
        );
        assert!(find(&alerts, WeatherAlertType::Frost).is_some());

        assert!(find(&temperature_alerts(2.0, july()), WeatherAlertType::LateFrost).is_none());
    }

    #[test]
    fn test_late_frost_window_uses_utc_month() {
        let end_of_may = Utc.with_ymd_and_hms(2024, 5, 31, 23, 30, 0).unwrap();
        assert!(find(&temperature_alerts(2.0, end_of_may), WeatherAlertType::LateFrost).is_some());

        let start_of_june = Utc.with_ymd_and_hms(2024, 6, 1, 0, 30, 0).unwrap();
        assert!(find(&temperature_alerts(2.0, start_of_june), WeatherAlertType::LateFrost).is_none());
    }

    #[test]
    fn test_heatwave_levels() {
        let alerts = temperature_alerts(38.0, july());
        assert_eq!(find(&alerts, WeatherAlertType::Heatwave).unwrap().level, RiskLevel::High);

        let alerts = temperature_alerts(41.0, july());
        assert_eq!(
            find(&alerts, WeatherAlertType::Heatwave).unwrap().level,
            RiskLevel::Critical
        );

        assert!(temperature_alerts(35.0, july()).is_empty());
    }

    #[test]
    fn test_storm_requires_rain_and_wind() {
        let alerts = generate_weather_alerts(None, None, Some(60.0), Some(70.0), 0, july());
        let storm = find(&alerts, WeatherAlertType::Storm).unwrap();
        assert_eq!(storm.level, RiskLevel::Critical);
        assert_eq!(storm.description, "Precipitación: 60mm/h, Viento: 70km/h");

        let alerts = generate_weather_alerts(None, None, Some(60.0), None, 0, july());
        assert!(find(&alerts, WeatherAlertType::Storm).is_none());

        let alerts = generate_weather_alerts(None, None, Some(60.0), Some(50.0), 0, july());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_drought_levels() {
        let level = |days| {
            let alerts = generate_weather_alerts(None, None, None, None, days, july());
            find(&alerts, WeatherAlertType::Drought).map(|a| a.level)
        };
        assert_eq!(level(6), None);
        assert_eq!(level(7), Some(RiskLevel::Medium));
        assert_eq!(level(9), Some(RiskLevel::Medium));
        assert_eq!(level(10), Some(RiskLevel::High));
        assert_eq!(level(13), Some(RiskLevel::High));
        assert_eq!(level(14), Some(RiskLevel::Critical));
    }

    #[test]
    fn test_excessive_rain_levels() {
        let alerts = generate_weather_alerts(None, None, Some(120.0), None, 0, july());
        assert_eq!(
            find(&alerts, WeatherAlertType::ExcessiveRain).unwrap().level,
            RiskLevel::High
        );

        let alerts = generate_weather_alerts(None, None, Some(160.0), None, 0, july());
        assert_eq!(
            find(&alerts, WeatherAlertType::ExcessiveRain).unwrap().level,
            RiskLevel::Critical
        );
    }

    #[test]
    fn test_rules_are_independent() {
        // Unknown temperature must not hide the rain-driven rules
        let alerts = generate_weather_alerts(None, Some(90.0), Some(160.0), Some(80.0), 14, july());
        let types: Vec<_> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            types,
            vec![
                WeatherAlertType::Storm,
                WeatherAlertType::Drought,
                WeatherAlertType::ExcessiveRain
            ]
        );

        assert!(generate_weather_alerts(None, None, None, None, 0, july()).is_empty());
    }
}
