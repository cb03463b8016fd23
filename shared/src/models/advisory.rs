//! Advisory models: weather alerts, irrigation guidance and the tagged union
//! over every kind of recommendation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DiseaseRisk;
use crate::types::RiskLevel;

/// Build an advisory id: `<kind>-<random uuid>`
pub fn advisory_id(kind: &str) -> String {
    format!("{}-{}", kind, Uuid::new_v4())
}

/// Kinds of severe-weather alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum WeatherAlertType {
    Frost,
    LateFrost,
    Heatwave,
    Storm,
    Drought,
    ExcessiveRain,
}

impl WeatherAlertType {
    pub const ALL: [WeatherAlertType; 6] = [
        WeatherAlertType::Frost,
        WeatherAlertType::LateFrost,
        WeatherAlertType::Heatwave,
        WeatherAlertType::Storm,
        WeatherAlertType::Drought,
        WeatherAlertType::ExcessiveRain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherAlertType::Frost => "frost",
            WeatherAlertType::LateFrost => "lateFrost",
            WeatherAlertType::Heatwave => "heatwave",
            WeatherAlertType::Storm => "storm",
            WeatherAlertType::Drought => "drought",
            WeatherAlertType::ExcessiveRain => "excessiveRain",
        }
    }
}

impl std::fmt::Display for WeatherAlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A triggered severe-weather alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: WeatherAlertType,
    pub level: RiskLevel,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub detected_at: DateTime<Utc>,
}

/// Direction to move the irrigation schedule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationAction {
    Increase,
    Decrease,
    Maintain,
}

impl std::fmt::Display for IrrigationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrrigationAction::Increase => write!(f, "increase"),
            IrrigationAction::Decrease => write!(f, "decrease"),
            IrrigationAction::Maintain => write!(f, "maintain"),
        }
    }
}

/// Irrigation guidance derived from soil moisture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrigationRecommendation {
    pub id: String,
    pub level: RiskLevel,
    pub action: IrrigationAction,
    pub reason: String,
    pub recommendation: String,
    pub detected_at: DateTime<Utc>,
}

/// Advisory category, used for filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryCategory {
    Disease,
    Weather,
    Irrigation,
}

impl std::fmt::Display for AdvisoryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvisoryCategory::Disease => write!(f, "disease"),
            AdvisoryCategory::Weather => write!(f, "weather"),
            AdvisoryCategory::Irrigation => write!(f, "irrigation"),
        }
    }
}

/// Any generated recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum Advisory {
    Disease(DiseaseRisk),
    Weather(WeatherAlert),
    Irrigation(IrrigationRecommendation),
}

impl Advisory {
    pub fn id(&self) -> &str {
        match self {
            Advisory::Disease(risk) => &risk.id,
            Advisory::Weather(alert) => &alert.id,
            Advisory::Irrigation(irrigation) => &irrigation.id,
        }
    }

    pub fn category(&self) -> AdvisoryCategory {
        match self {
            Advisory::Disease(_) => AdvisoryCategory::Disease,
            Advisory::Weather(_) => AdvisoryCategory::Weather,
            Advisory::Irrigation(_) => AdvisoryCategory::Irrigation,
        }
    }

    pub fn level(&self) -> RiskLevel {
        match self {
            Advisory::Disease(risk) => risk.level,
            Advisory::Weather(alert) => alert.level,
            Advisory::Irrigation(irrigation) => irrigation.level,
        }
    }

    pub fn recommendation(&self) -> &str {
        match self {
            Advisory::Disease(risk) => &risk.recommendation,
            Advisory::Weather(alert) => &alert.recommendation,
            Advisory::Irrigation(irrigation) => &irrigation.recommendation,
        }
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        match self {
            Advisory::Disease(risk) => risk.detected_at,
            Advisory::Weather(alert) => alert.detected_at,
            Advisory::Irrigation(irrigation) => irrigation.detected_at,
        }
    }

    /// One-line headline for listings
    pub fn headline(&self) -> String {
        match self {
            Advisory::Disease(risk) => format!("{} ({}%)", risk.disease, risk.probability),
            Advisory::Weather(alert) => format!("{}: {}", alert.title, alert.description),
            Advisory::Irrigation(irrigation) => {
                format!("{} irrigation: {}", irrigation.action, irrigation.reason)
            }
        }
    }
}

impl From<DiseaseRisk> for Advisory {
    fn from(value: DiseaseRisk) -> Self {
        Advisory::Disease(value)
    }
}

impl From<WeatherAlert> for Advisory {
    fn from(value: WeatherAlert) -> Self {
        Advisory::Weather(value)
    }
}

impl From<IrrigationRecommendation> for Advisory {
    fn from(value: IrrigationRecommendation) -> Self {
        Advisory::Irrigation(value)
    }
}
