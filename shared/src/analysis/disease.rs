//! Disease risk evaluation
//!
//! Each disease is scored on three factors (temperature, humidity and
//! precipitation, with humidity standing in when the disease has no rain
//! threshold). A factor's favorability is a value in [0, 1]; the weighted sum
//! becomes the infection probability.

use chrono::{DateTime, Utc};

use crate::models::{advisory_id, DiseaseRisk, DiseaseType, WeatherConditions};
use crate::thresholds::{
    classify_risk_level, disease_config, FAVORABILITY_MARGIN, FAVORABLE_FACTOR_THRESHOLD,
    HUMIDITY_CEILING, HUMIDITY_IDEAL_CEILING, TEMPERATURE_IDEAL_INSET,
    UNRECOGNIZED_DISEASE_MESSAGE,
};
use crate::types::RiskLevel;

/// How conducive `value` is to a disease whose window is [min, max].
///
/// With an ideal band the score is 1 inside it and ramps linearly from 0 at
/// the outer bound to 1 at the ideal edge. Without one the score is 1 inside
/// [min, max] and decays to 0 over [`FAVORABILITY_MARGIN`] units outside it.
/// Unknown values score 0.
pub fn favorability(value: Option<f64>, min: f64, max: f64, ideal: Option<(f64, f64)>) -> f64 {
    let Some(value) = value.filter(|v| !v.is_nan()) else {
        return 0.0;
    };

    match ideal {
        Some((ideal_min, ideal_max)) => {
            if (ideal_min..=ideal_max).contains(&value) {
                1.0
            } else if value < ideal_min {
                ramp(value - min, ideal_min - min)
            } else {
                ramp(max - value, max - ideal_max)
            }
        }
        None => {
            if (min..=max).contains(&value) {
                1.0
            } else if value < min {
                ramp(value - (min - FAVORABILITY_MARGIN), FAVORABILITY_MARGIN)
            } else {
                ramp(max + FAVORABILITY_MARGIN - value, FAVORABILITY_MARGIN)
            }
        }
    }
}

/// `distance / span` clamped at 0; a collapsed span scores 0
fn ramp(distance: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    (distance / span).max(0.0)
}

/// Evaluate one disease at the given instant
pub fn evaluate_disease(
    disease: &DiseaseType,
    conditions: &WeatherConditions,
    now: DateTime<Utc>,
) -> DiseaseRisk {
    let Some(config) = disease_config(disease) else {
        return DiseaseRisk {
            id: advisory_id(&format!("disease-{}", disease)),
            disease: disease.clone(),
            level: RiskLevel::Low,
            probability: 0,
            conditions: Vec::new(),
            recommendation: UNRECOGNIZED_DISEASE_MESSAGE.to_string(),
            detected_at: now,
        };
    };
    let thresholds = &config.thresholds;
    let weights = &config.weights;
    let mut triggered = Vec::new();

    let temperature_fav = favorability(
        conditions.temperature,
        thresholds.temp_min,
        thresholds.temp_max,
        Some((
            thresholds.temp_min + TEMPERATURE_IDEAL_INSET,
            thresholds.temp_max - TEMPERATURE_IDEAL_INSET,
        )),
    );
    if let Some(temperature) = conditions.temperature {
        if temperature_fav > FAVORABLE_FACTOR_THRESHOLD {
            triggered.push(format!("Temperatura {}°C favorable", temperature));
        }
    }

    let humidity_fav = favorability(
        conditions.humidity,
        thresholds.humidity_min,
        HUMIDITY_CEILING,
        Some((thresholds.humidity_min, HUMIDITY_IDEAL_CEILING)),
    );
    if let Some(humidity) = conditions.humidity {
        if humidity_fav > FAVORABLE_FACTOR_THRESHOLD {
            triggered.push(format!("Humedad {}% favorable", humidity));
        }
    }

    // Without a rain threshold, humidity substitutes for the missing signal
    let precipitation_fav = match thresholds.precipitation_min {
        Some(rain) if rain > 0.0 => favorability(
            conditions.precipitation,
            0.0,
            rain * 2.0,
            Some((rain, rain * 2.0)),
        ),
        _ => favorability(
            conditions.humidity,
            thresholds.humidity_min,
            HUMIDITY_CEILING,
            None,
        ),
    };
    if let Some(precipitation) = conditions.precipitation {
        if precipitation_fav > FAVORABLE_FACTOR_THRESHOLD && precipitation > 0.0 {
            triggered.push(format!("Precipitación {}mm favorable", precipitation));
        }
    }

    let weighted = temperature_fav * weights.temperature * 100.0
        + humidity_fav * weights.humidity * 100.0
        + precipitation_fav * weights.precipitation * 100.0;
    let probability = weighted.round().clamp(0.0, 100.0) as u8;
    let level = classify_risk_level(probability);

    DiseaseRisk {
        id: advisory_id(&format!("disease-{}", disease)),
        disease: disease.clone(),
        level,
        probability,
        conditions: triggered,
        recommendation: config.recommendations.for_level(level).to_string(),
        detected_at: now,
    }
}

/// Evaluate every catalogued disease, in catalog order
pub fn evaluate_all_diseases(conditions: &WeatherConditions, now: DateTime<Utc>) -> Vec<DiseaseRisk> {
    DiseaseType::KNOWN
        .iter()
        .map(|disease| evaluate_disease(disease, conditions, now))
        .collect()
}

/// Risks at high or critical level
pub fn high_risk_diseases(risks: &[DiseaseRisk]) -> Vec<&DiseaseRisk> {
    risks.iter().filter(|risk| risk.level.is_elevated()).collect()
}

/// Recommendations of the high and critical risks
pub fn high_risk_recommendations(risks: &[DiseaseRisk]) -> Vec<&str> {
    high_risk_diseases(risks)
        .into_iter()
        .map(|risk| risk.recommendation.as_str())
        .collect()
}

pub fn has_high_risk(risks: &[DiseaseRisk]) -> bool {
    risks.iter().any(|risk| risk.level.is_elevated())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn conditions(temperature: f64, humidity: f64, precipitation: f64) -> WeatherConditions {
        WeatherConditions {
            temperature: Some(temperature),
            humidity: Some(humidity),
            precipitation: Some(precipitation),
            ..WeatherConditions::default()
        }
    }

    #[test]
    fn test_favorability_plain_window() {
        assert_eq!(favorability(Some(20.0), 10.0, 30.0, None), 1.0);
        assert_eq!(favorability(Some(7.5), 10.0, 30.0, None), 0.5);
        assert_eq!(favorability(Some(5.0), 10.0, 30.0, None), 0.0);
        assert_eq!(favorability(Some(32.5), 10.0, 30.0, None), 0.5);
        assert_eq!(favorability(Some(40.0), 10.0, 30.0, None), 0.0);
        assert_eq!(favorability(None, 10.0, 30.0, None), 0.0);
    }

    #[test]
    fn test_favorability_ideal_band() {
        let ideal = Some((11.0, 21.0));
        assert_eq!(favorability(Some(15.0), 6.0, 26.0, ideal), 1.0);
        assert_eq!(favorability(Some(8.5), 6.0, 26.0, ideal), 0.5);
        assert_eq!(favorability(Some(23.5), 6.0, 26.0, ideal), 0.5);
        assert_eq!(favorability(Some(0.0), 6.0, 26.0, ideal), 0.0);
        assert_eq!(favorability(Some(30.0), 6.0, 26.0, ideal), 0.0);
    }

    #[test]
    fn test_favorability_collapsed_span_scores_zero() {
        // Precipitation above twice the threshold has no ramp to fall back on
        assert_eq!(favorability(Some(20.0), 0.0, 12.0, Some((6.0, 12.0))), 0.0);
        // Humidity below the minimum when the ideal band starts at the minimum
        assert_eq!(favorability(Some(85.0), 90.0, 100.0, Some((90.0, 95.0))), 0.0);
    }

    #[test]
    fn test_all_null_conditions_are_low() {
        let now = Utc::now();
        for risk in evaluate_all_diseases(&WeatherConditions::default(), now) {
            assert_eq!(risk.probability, 0);
            assert_eq!(risk.level, RiskLevel::Low);
            assert!(risk.conditions.is_empty());
        }
    }

    #[test]
    fn test_mildiu_ideal_conditions_are_critical() {
        let risk = evaluate_disease(&DiseaseType::Mildiu, &conditions(18.0, 92.0, 8.0), Utc::now());
        assert_eq!(risk.probability, 100);
        assert_eq!(risk.level, RiskLevel::Critical);
        assert_eq!(risk.conditions.len(), 3);
        assert_eq!(
            risk.recommendation,
            "Riesgo crítico de Mildiú. Aplicar fungicida inmediatamente y aumentar aireación."
        );
    }

    #[test]
    fn test_botrytis_uses_humidity_for_precipitation_factor() {
        // 20°C is ideal, 90% humidity is ideal: humidity also fills the rain slot
        let risk = evaluate_disease(&DiseaseType::Botrytis, &conditions(20.0, 90.0, 0.0), Utc::now());
        assert_eq!(risk.probability, 100);
        // No rain fell, so the precipitation condition is not reported
        assert_eq!(risk.conditions.len(), 2);
    }

    #[test]
    fn test_oidio_moderate_conditions() {
        // Temperature is ideal; 30% humidity sits below the 40% minimum and
        // more than one margin below it, so both humidity factors score 0
        let risk = evaluate_disease(&DiseaseType::Oidio, &conditions(22.0, 30.0, 0.0), Utc::now());
        assert_eq!(risk.probability, 40);
        assert_eq!(risk.level, RiskLevel::Medium);
    }

    #[test]
    fn test_unknown_disease_degrades_gracefully() {
        let risk = evaluate_disease(
            &DiseaseType::Other("black_rot".to_string()),
            &conditions(18.0, 95.0, 10.0),
            Utc::now(),
        );
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.probability, 0);
        assert!(risk.conditions.is_empty());
        assert_eq!(risk.recommendation, UNRECOGNIZED_DISEASE_MESSAGE);
    }

    #[test]
    fn test_evaluate_all_returns_catalog_order() {
        let risks = evaluate_all_diseases(&conditions(18.0, 95.0, 10.0), Utc::now());
        let order: Vec<_> = risks.iter().map(|r| r.disease.clone()).collect();
        assert_eq!(order, DiseaseType::KNOWN.to_vec());
    }

    #[test]
    fn test_high_risk_filter_and_recommendations() {
        let now = Utc::now();
        let risks = evaluate_all_diseases(&conditions(18.0, 92.0, 8.0), now);
        let high = high_risk_diseases(&risks);
        assert!(!high.is_empty());
        assert!(high.iter().all(|r| r.level.is_elevated()));
        assert_eq!(high_risk_recommendations(&risks).len(), high.len());
        assert!(has_high_risk(&risks));
        assert!(!has_high_risk(&evaluate_all_diseases(&WeatherConditions::default(), now)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_probability_bounded_and_banded(
            temperature in proptest::option::of(-30.0f64..50.0),
            humidity in proptest::option::of(0.0f64..100.0),
            precipitation in proptest::option::of(0.0f64..200.0),
        ) {
            let conditions = WeatherConditions {
                temperature,
                humidity,
                precipitation,
                ..WeatherConditions::default()
            };
            for risk in evaluate_all_diseases(&conditions, Utc::now()) {
                prop_assert!(risk.probability <= 100);
                prop_assert_eq!(risk.level, classify_risk_level(risk.probability));
            }
        }

        #[test]
        fn prop_high_risk_filter_never_returns_low_or_medium(
            temperature in -30.0f64..50.0,
            humidity in 0.0f64..100.0,
            precipitation in 0.0f64..200.0,
        ) {
            let risks = evaluate_all_diseases(&conditions(temperature, humidity, precipitation), Utc::now());
            for risk in high_risk_diseases(&risks) {
                prop_assert!(risk.level == RiskLevel::High || risk.level == RiskLevel::Critical);
            }
        }
    }
}
