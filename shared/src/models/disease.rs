//! Vine disease models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LevelMessages, RiskLevel};

/// Fungal diseases tracked by the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiseaseType {
    /// Downy mildew (Plasmopara viticola)
    Mildiu,
    /// Grey mold (Botrytis cinerea)
    Botrytis,
    /// Powdery mildew (Erysiphe necator)
    Oidio,
    /// Phomopsis cane and leaf spot
    Excoriosis,
    /// A disease name with no catalog entry
    Other(String),
}

impl DiseaseType {
    /// Diseases with a catalog entry, in evaluation order
    pub const KNOWN: [DiseaseType; 4] = [
        DiseaseType::Mildiu,
        DiseaseType::Botrytis,
        DiseaseType::Oidio,
        DiseaseType::Excoriosis,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            DiseaseType::Mildiu => "mildiu",
            DiseaseType::Botrytis => "botrytis",
            DiseaseType::Oidio => "oidio",
            DiseaseType::Excoriosis => "excoriosis",
            DiseaseType::Other(name) => name,
        }
    }
}

impl From<&str> for DiseaseType {
    fn from(value: &str) -> Self {
        match value {
            "mildiu" => DiseaseType::Mildiu,
            "botrytis" => DiseaseType::Botrytis,
            "oidio" => DiseaseType::Oidio,
            "excoriosis" => DiseaseType::Excoriosis,
            other => DiseaseType::Other(other.to_string()),
        }
    }
}

impl From<String> for DiseaseType {
    fn from(value: String) -> Self {
        DiseaseType::from(value.as_str())
    }
}

impl From<DiseaseType> for String {
    fn from(value: DiseaseType) -> Self {
        match value {
            DiseaseType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DiseaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Climatic window in which a disease develops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseaseThresholds {
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_min: f64,
    pub humidity_max: Option<f64>,
    /// Rain (mm) that saturates the precipitation factor at its half-range
    pub precipitation_min: Option<f64>,
    pub wetness_hours_min: Option<f64>,
    pub incubation_days: Option<u32>,
}

/// Contribution of each factor to the final probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseaseWeights {
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
}

/// Static catalog entry for a disease
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseaseConfig {
    pub name: &'static str,
    pub thresholds: DiseaseThresholds,
    pub weights: DiseaseWeights,
    pub recommendations: LevelMessages,
}

/// Result of evaluating one disease against the current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRisk {
    pub id: String,
    pub disease: DiseaseType,
    pub level: RiskLevel,
    /// Percentage in 0..=100
    pub probability: u8,
    /// Human-readable list of the factors that favour the disease
    pub conditions: Vec<String>,
    pub recommendation: String,
    pub detected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disease_type_round_trips_through_names() {
        for disease in DiseaseType::KNOWN {
            assert_eq!(DiseaseType::from(disease.as_str()), disease);
        }
        assert_eq!(
            DiseaseType::from("black_rot"),
            DiseaseType::Other("black_rot".to_string())
        );
    }

    #[test]
    fn test_disease_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&DiseaseType::Oidio).unwrap();
        assert_eq!(json, "\"oidio\"");
        let parsed: DiseaseType = serde_json::from_str("\"esca\"").unwrap();
        assert_eq!(parsed, DiseaseType::Other("esca".to_string()));
    }
}
