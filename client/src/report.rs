//! Per-parcel advisory reports

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vitisguard_shared::{
    analyze_response_in, response_context, Advisory, Parcel, Recommendations, WeatherResponse,
};

/// Prioritized advisories for one parcel at one instant
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelReport {
    pub parcel: Parcel,
    pub generated_at: DateTime<Utc>,
    pub days_without_rain: u32,
    pub advisories: Vec<Advisory>,
}

impl ParcelReport {
    /// Analyze a forecast for a parcel. `days_without_rain` overrides the
    /// dry streak derived from the daily series.
    pub fn build(
        parcel: Parcel,
        response: &WeatherResponse,
        days_without_rain: Option<u32>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut context = response_context(response, now);
        if let Some(days) = days_without_rain {
            context.days_without_rain = days;
        }

        let mut recommendations = Recommendations::new();
        recommendations.set_recommendations(analyze_response_in(response, &context));

        Self {
            parcel,
            generated_at: now,
            days_without_rain: context.days_without_rain,
            advisories: recommendations
                .prioritized(None)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Plain-text rendering for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} [{}] at {}",
            self.parcel.name,
            self.parcel.location(),
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        if self.advisories.is_empty() {
            let _ = writeln!(out, "  no advisories");
            return out;
        }
        for advisory in &self.advisories {
            let _ = writeln!(
                out,
                "  [{:<8}] {:<10} {}",
                advisory.level().as_str(),
                advisory.category().to_string(),
                advisory.headline()
            );
            let _ = writeln!(out, "             {}", advisory.recommendation());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vitisguard_shared::{CurrentData, HourlyData, IrrigationAction, RiskLevel};

    fn frosty_response() -> WeatherResponse {
        WeatherResponse {
            current: Some(CurrentData {
                time: "2024-01-10T06:00".to_string(),
                temperature_2m: Some(-7.0),
                relative_humidity_2m: Some(60.0),
                ..CurrentData::default()
            }),
            ..WeatherResponse::default()
        }
    }

    #[test]
    fn test_report_is_prioritized() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap();
        let parcel = Parcel::new("p1", "Viña Norte", 42.46, -2.45);
        let report = ParcelReport::build(parcel, &frosty_response(), Some(3), now);

        assert_eq!(report.days_without_rain, 3);
        assert_eq!(report.advisories[0].level(), RiskLevel::Critical);
        let levels: Vec<u8> = report.advisories.iter().map(|a| a.level().priority()).collect();
        let mut sorted = levels.clone();
        sorted.sort();
        assert_eq!(levels, sorted);

        let text = report.render();
        assert!(text.starts_with("Viña Norte [42.4600,-2.4500]"));
        assert!(text.contains("Helada"));
    }

    #[test]
    fn test_report_uses_current_hour_of_long_history() {
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let hours: Vec<String> = (1..=15)
            .flat_map(|day| (0..24).map(move |hour| format!("2024-07-{:02}T{:02}:00", day, hour)))
            .collect();
        let mut soil = vec![Some(50.0); hours.len()];
        soil[0] = Some(10.0);
        let response = WeatherResponse {
            hourly: HourlyData {
                time: hours,
                soil_moisture_0_to_7cm: Some(soil),
                ..HourlyData::default()
            },
            ..WeatherResponse::default()
        };

        let parcel = Parcel::new("p1", "Viña Norte", 42.46, -2.45);
        let report = ParcelReport::build(parcel, &response, None, now);
        let action = report.advisories.iter().find_map(|a| match a {
            Advisory::Irrigation(rec) => Some(rec.action),
            _ => None,
        });
        assert_eq!(action, Some(IrrigationAction::Maintain));
    }
}
