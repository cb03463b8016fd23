//! Threshold catalog
//!
//! Static agronomic policy: disease windows and weights, alert thresholds,
//! soil-moisture bands and the message tables bound to each risk level.
//! Every boundary the evaluators compare against lives here so tests can
//! target exact edges.

use std::ops::RangeInclusive;

use crate::models::{DiseaseConfig, DiseaseThresholds, DiseaseType, DiseaseWeights, WeatherAlertType};
use crate::types::{LevelMessages, RiskLevel};

// ============================================================================
// Favorability policy
// ============================================================================

/// Width of the linear decay outside a plain [min, max] window
pub const FAVORABILITY_MARGIN: f64 = 5.0;

/// Distance of the ideal temperature band from each edge of the disease window
pub const TEMPERATURE_IDEAL_INSET: f64 = 5.0;

/// Upper bound of the humidity window
pub const HUMIDITY_CEILING: f64 = 100.0;

/// Upper edge of the ideal humidity band
pub const HUMIDITY_IDEAL_CEILING: f64 = 95.0;

/// A factor above this favorability is reported as a triggered condition
pub const FAVORABLE_FACTOR_THRESHOLD: f64 = 0.5;

// ============================================================================
// Risk bands (upper bound inclusive)
// ============================================================================

pub const LOW_RISK_MAX: u8 = 30;
pub const MEDIUM_RISK_MAX: u8 = 60;
pub const HIGH_RISK_MAX: u8 = 85;

/// Map a probability (0-100) onto its risk band
pub fn classify_risk_level(probability: u8) -> RiskLevel {
    if probability <= LOW_RISK_MAX {
        RiskLevel::Low
    } else if probability <= MEDIUM_RISK_MAX {
        RiskLevel::Medium
    } else if probability <= HIGH_RISK_MAX {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

// ============================================================================
// Diseases
// ============================================================================

/// Message used when a disease has no catalog entry
pub const UNRECOGNIZED_DISEASE_MESSAGE: &str = "Enfermedad no reconocida";

static MILDIU: DiseaseConfig = DiseaseConfig {
    name: "Mildiú (Downy Mildew)",
    thresholds: DiseaseThresholds {
        temp_min: 6.0,
        temp_max: 26.0,
        humidity_min: 90.0,
        humidity_max: None,
        precipitation_min: Some(6.0),
        wetness_hours_min: None,
        incubation_days: Some(7),
    },
    weights: DiseaseWeights {
        temperature: 0.35,
        humidity: 0.40,
        precipitation: 0.25,
    },
    recommendations: LevelMessages {
        low: "Condiciones desfavorables para Mildiú. Continuar monitoreo regular.",
        medium: "Monitorear condiciones. Preparar fungicida preventivo.",
        high: "Alto riesgo de Mildiú. Considerar aplicación preventiva de fungicida.",
        critical: "Riesgo crítico de Mildiú. Aplicar fungicida inmediatamente y aumentar aireación.",
    },
};

static BOTRYTIS: DiseaseConfig = DiseaseConfig {
    name: "Botrytis (Grey Mold)",
    thresholds: DiseaseThresholds {
        temp_min: 15.0,
        temp_max: 25.0,
        humidity_min: 80.0,
        humidity_max: None,
        precipitation_min: None,
        wetness_hours_min: Some(10.0),
        incubation_days: None,
    },
    weights: DiseaseWeights {
        temperature: 0.30,
        humidity: 0.45,
        precipitation: 0.25,
    },
    recommendations: LevelMessages {
        low: "Condiciones desfavorables para Botrytis. Continuar monitoreo.",
        medium: "Riesgo moderado. Eliminar racimos dañados.",
        high: "Alto riesgo de Botrytis. Aplicar tratamiento fungicida y mejorar ventilación.",
        critical: "Riesgo crítico. Eliminar racimos afectados inmediatamente y aplicar fungicida.",
    },
};

static OIDIO: DiseaseConfig = DiseaseConfig {
    name: "Oídio (Powdery Mildew)",
    thresholds: DiseaseThresholds {
        temp_min: 15.0,
        temp_max: 28.0,
        humidity_min: 40.0,
        humidity_max: Some(80.0),
        precipitation_min: None,
        wetness_hours_min: None,
        incubation_days: None,
    },
    weights: DiseaseWeights {
        temperature: 0.40,
        humidity: 0.35,
        precipitation: 0.25,
    },
    recommendations: LevelMessages {
        low: "Condiciones desfavorables para Oídio.",
        medium: "Monitorear plantas sensibles.",
        high: "Alto riesgo de Oídio. Aplicar azufre o fungicida.",
        critical: "Riesgo crítico. Aplicar tratamiento inmediatamente.",
    },
};

static EXCORIOSIS: DiseaseConfig = DiseaseConfig {
    name: "Excoriosis (Phomopsis)",
    thresholds: DiseaseThresholds {
        temp_min: 5.0,
        temp_max: 25.0,
        humidity_min: 85.0,
        humidity_max: None,
        precipitation_min: Some(2.0),
        wetness_hours_min: None,
        incubation_days: None,
    },
    weights: DiseaseWeights {
        temperature: 0.35,
        humidity: 0.40,
        precipitation: 0.25,
    },
    recommendations: LevelMessages {
        low: "Condiciones desfavorables para Excoriosis.",
        medium: "Monitorear heridas de poda.",
        high: "Alto riesgo. Aplicar tratamiento preventivo.",
        critical: "Riesgo crítico. Tratar inmediatamente.",
    },
};

/// Catalog entry for a disease, `None` for names without one
pub fn disease_config(disease: &DiseaseType) -> Option<&'static DiseaseConfig> {
    match disease {
        DiseaseType::Mildiu => Some(&MILDIU),
        DiseaseType::Botrytis => Some(&BOTRYTIS),
        DiseaseType::Oidio => Some(&OIDIO),
        DiseaseType::Excoriosis => Some(&EXCORIOSIS),
        DiseaseType::Other(_) => None,
    }
}

// ============================================================================
// Weather alerts
// ============================================================================

/// Below this temperature (°C) frost is reported
pub const FROST_TEMPERATURE: f64 = 0.0;
/// Below this temperature (°C) frost is critical
pub const SEVERE_FROST_TEMPERATURE: f64 = -5.0;
/// Below this temperature (°C) a late frost is reported inside the spring window
pub const LATE_FROST_TEMPERATURE: f64 = 3.0;
/// Months (1-12) of bud break in the northern hemisphere
pub const LATE_FROST_MONTHS: RangeInclusive<u32> = 3..=5;
/// Above this temperature (°C) a heatwave is reported
pub const HEATWAVE_TEMPERATURE: f64 = 35.0;
/// Above this temperature (°C) a heatwave is critical
pub const EXTREME_HEAT_TEMPERATURE: f64 = 40.0;
/// Storm needs precipitation (mm/h) above this
pub const STORM_PRECIPITATION: f64 = 50.0;
/// Storm needs wind speed (km/h) above this
pub const STORM_WIND_SPEED: f64 = 50.0;
/// Dry days before a drought alert (medium)
pub const DROUGHT_DAYS: u32 = 7;
/// Dry days before a drought alert becomes high
pub const DROUGHT_HIGH_DAYS: u32 = 10;
/// Dry days before a drought alert becomes critical
pub const DROUGHT_CRITICAL_DAYS: u32 = 14;
/// Precipitation (mm) above this is excessive
pub const EXCESSIVE_RAIN_PRECIPITATION: f64 = 100.0;
/// Precipitation (mm) above this is critically excessive
pub const EXTREME_RAIN_PRECIPITATION: f64 = 150.0;
/// Daily precipitation sum (mm) below which a day counts as dry
pub const DRY_DAY_PRECIPITATION: f64 = 0.1;

/// Static catalog entry for an alert type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherAlertConfig {
    pub alert_type: WeatherAlertType,
    pub title: &'static str,
    pub description: &'static str,
    pub recommendations: LevelMessages,
}

static FROST: WeatherAlertConfig = WeatherAlertConfig {
    alert_type: WeatherAlertType::Frost,
    title: "Helada",
    description: "Temperatura bajo cero detectada",
    recommendations: LevelMessages {
        low: "Monitorear condiciones.",
        medium: "Considerar protección de plantas sensibles.",
        high: "Aplicar protección inmediata a cultivos sensibles.",
        critical: "ALERTA: Cubra las plantas inmediatamente. Riesgo de daños severos.",
    },
};

static LATE_FROST: WeatherAlertConfig = WeatherAlertConfig {
    alert_type: WeatherAlertType::LateFrost,
    title: "Helada Tardía",
    description: "Temperatura baja detectada en época de crecimiento",
    recommendations: LevelMessages {
        low: "Monitorear pronóstico.",
        medium: "Preparar sistemas de protección.",
        high: "Activar protección de cultivos.",
        critical: "Riesgo de daños severos. Aplicar protección urgente.",
    },
};

static HEATWAVE: WeatherAlertConfig = WeatherAlertConfig {
    alert_type: WeatherAlertType::Heatwave,
    title: "Ola de Calor",
    description: "Temperaturas extremas detectadas",
    recommendations: LevelMessages {
        low: "Mantener monitoreo.",
        medium: "Aumentar riego matutino.",
        high: "Proveer sombra a plantas sensibles.",
        critical: "Riesgo de estrés térmico severo. Regar inmediatamente y proporcionar sombra.",
    },
};

static STORM: WeatherAlertConfig = WeatherAlertConfig {
    alert_type: WeatherAlertType::Storm,
    title: "Tormenta",
    description: "Condiciones de tormenta severas",
    recommendations: LevelMessages {
        low: "Monitorear.",
        medium: "Asegurar estructuras de soporte.",
        high: "Proteger plantas delicadas.",
        critical: "Peligro inmediato. Asegurar todas las estructuras y plantas.",
    },
};

static DROUGHT: WeatherAlertConfig = WeatherAlertConfig {
    alert_type: WeatherAlertType::Drought,
    title: "Sequía",
    description: "Período prolongado sin precipitación",
    recommendations: LevelMessages {
        low: "Monitorear humedad del suelo.",
        medium: "Considerar riego preventivo.",
        high: "Incrementar frecuencia de riego.",
        critical: "Emergencia de agua. Riego urgente necesario.",
    },
};

static EXCESSIVE_RAIN: WeatherAlertConfig = WeatherAlertConfig {
    alert_type: WeatherAlertType::ExcessiveRain,
    title: "Exceso de Lluvia",
    description: "Precipitación excesiva acumulada",
    recommendations: LevelMessages {
        low: "Monitorear drenaje.",
        medium: "Verificar sistemas de drenaje.",
        high: "Activar drenaje preventivo.",
        critical: "Riesgo de inundación. Drenaje inmediato requerido.",
    },
};

/// Catalog entry for an alert type
pub fn alert_config(alert_type: WeatherAlertType) -> &'static WeatherAlertConfig {
    match alert_type {
        WeatherAlertType::Frost => &FROST,
        WeatherAlertType::LateFrost => &LATE_FROST,
        WeatherAlertType::Heatwave => &HEATWAVE,
        WeatherAlertType::Storm => &STORM,
        WeatherAlertType::Drought => &DROUGHT,
        WeatherAlertType::ExcessiveRain => &EXCESSIVE_RAIN,
    }
}

// ============================================================================
// Irrigation
// ============================================================================

/// Soil moisture (%) below which irrigation is urgent
pub const SOIL_MOISTURE_VERY_LOW: f64 = 20.0;
/// Soil moisture (%) below which irrigation should increase
pub const SOIL_MOISTURE_LOW: f64 = 30.0;
/// Soil moisture (%) above which irrigation should stop
pub const SOIL_MOISTURE_VERY_HIGH: f64 = 80.0;
/// Soil moisture (%) above which irrigation should decrease
pub const SOIL_MOISTURE_HIGH: f64 = 70.0;
/// Reference evapotranspiration (mm/day) considered high
pub const HIGH_EVAPOTRANSPIRATION: f64 = 5.0;
/// High evapotranspiration only triggers irrigation below this soil moisture (%)
pub const EVAPOTRANSPIRATION_SOIL_MOISTURE_CEILING: f64 = 50.0;

pub const IRRIGATION_URGENT_MESSAGE: &str =
    "Riego urgente necesario. Incrementar frecuencia y cantidad.";
pub const IRRIGATION_INCREASE_MESSAGE: &str = "Incrementar frecuencia de riego.";
pub const IRRIGATION_SUSPEND_MESSAGE: &str = "Reducir o suspender riego. Verificar drenaje.";
pub const IRRIGATION_REDUCE_MESSAGE: &str = "Reducir frecuencia de riego.";
pub const IRRIGATION_EVAPORATION_MESSAGE: &str = "Considerar riego por alta evaporación.";
pub const IRRIGATION_MAINTAIN_MESSAGE: &str = "Mantener rutina de riego actual.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bands_are_inclusive_on_upper_edge() {
        assert_eq!(classify_risk_level(0), RiskLevel::Low);
        assert_eq!(classify_risk_level(30), RiskLevel::Low);
        assert_eq!(classify_risk_level(31), RiskLevel::Medium);
        assert_eq!(classify_risk_level(60), RiskLevel::Medium);
        assert_eq!(classify_risk_level(61), RiskLevel::High);
        assert_eq!(classify_risk_level(85), RiskLevel::High);
        assert_eq!(classify_risk_level(86), RiskLevel::Critical);
        assert_eq!(classify_risk_level(100), RiskLevel::Critical);
    }

    #[test]
    fn test_every_known_disease_has_config() {
        for disease in DiseaseType::KNOWN {
            let config = disease_config(&disease).expect("known disease");
            let weights = config.weights;
            assert!(weights.temperature >= 0.0);
            assert!(weights.humidity >= 0.0);
            assert!(weights.precipitation >= 0.0);
            let total = weights.temperature + weights.humidity + weights.precipitation;
            assert!((total - 1.0).abs() < 1e-9);
        }
        assert!(disease_config(&DiseaseType::Other("esca".to_string())).is_none());
    }

    #[test]
    fn test_alert_catalog_matches_type() {
        for alert_type in WeatherAlertType::ALL {
            assert_eq!(alert_config(alert_type).alert_type, alert_type);
        }
    }
}
