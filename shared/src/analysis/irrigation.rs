//! Irrigation guidance from soil moisture and evaporative demand

use chrono::{DateTime, Utc};

use crate::models::{advisory_id, IrrigationAction, IrrigationRecommendation};
use crate::thresholds::{
    EVAPOTRANSPIRATION_SOIL_MOISTURE_CEILING, HIGH_EVAPOTRANSPIRATION,
    IRRIGATION_EVAPORATION_MESSAGE, IRRIGATION_INCREASE_MESSAGE, IRRIGATION_MAINTAIN_MESSAGE,
    IRRIGATION_REDUCE_MESSAGE, IRRIGATION_SUSPEND_MESSAGE, IRRIGATION_URGENT_MESSAGE,
    SOIL_MOISTURE_HIGH, SOIL_MOISTURE_LOW, SOIL_MOISTURE_VERY_HIGH, SOIL_MOISTURE_VERY_LOW,
};
use crate::types::RiskLevel;

/// Produce at most one irrigation recommendation.
///
/// Branches are checked in priority order and the first match wins. Nothing is
/// produced when soil moisture is unknown. Precipitation is accepted for
/// parity with the other evaluators and does not affect the decision.
pub fn generate_irrigation_recommendation(
    soil_moisture: Option<f64>,
    evapotranspiration: Option<f64>,
    _precipitation: Option<f64>,
    now: DateTime<Utc>,
) -> Option<IrrigationRecommendation> {
    let moisture = soil_moisture.filter(|m| !m.is_nan())?;

    let (level, action, reason, recommendation) = if moisture < SOIL_MOISTURE_VERY_LOW {
        (
            RiskLevel::High,
            IrrigationAction::Increase,
            format!("Humedad del suelo muy baja: {}%", moisture),
            IRRIGATION_URGENT_MESSAGE,
        )
    } else if moisture < SOIL_MOISTURE_LOW {
        (
            RiskLevel::Medium,
            IrrigationAction::Increase,
            format!("Humedad del suelo baja: {}%", moisture),
            IRRIGATION_INCREASE_MESSAGE,
        )
    } else if moisture > SOIL_MOISTURE_VERY_HIGH {
        (
            RiskLevel::High,
            IrrigationAction::Decrease,
            format!("Humedad del suelo muy alta: {}%", moisture),
            IRRIGATION_SUSPEND_MESSAGE,
        )
    } else if moisture > SOIL_MOISTURE_HIGH {
        (
            RiskLevel::Medium,
            IrrigationAction::Decrease,
            format!("Humedad del suelo elevada: {}%", moisture),
            IRRIGATION_REDUCE_MESSAGE,
        )
    } else {
        match evapotranspiration {
            Some(et)
                if et > HIGH_EVAPOTRANSPIRATION
                    && moisture < EVAPOTRANSPIRATION_SOIL_MOISTURE_CEILING =>
            {
                (
                    RiskLevel::Medium,
                    IrrigationAction::Increase,
                    format!("Alta evapotranspiración: {}mm/día", et),
                    IRRIGATION_EVAPORATION_MESSAGE,
                )
            }
            _ => (
                RiskLevel::Low,
                IrrigationAction::Maintain,
                format!("Humedad del suelo óptima: {}%", moisture),
                IRRIGATION_MAINTAIN_MESSAGE,
            ),
        }
    };

    Some(IrrigationRecommendation {
        id: advisory_id("irrigation"),
        level,
        action,
        reason,
        recommendation: recommendation.to_string(),
        detected_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decide(soil: f64, et: Option<f64>) -> (RiskLevel, IrrigationAction) {
        let rec = generate_irrigation_recommendation(Some(soil), et, None, Utc::now()).unwrap();
        (rec.level, rec.action)
    }

    #[test]
    fn test_unknown_soil_moisture_yields_nothing() {
        assert!(generate_irrigation_recommendation(None, Some(8.0), Some(0.0), Utc::now()).is_none());
    }

    #[test]
    fn test_moisture_bands() {
        assert_eq!(decide(15.0, None), (RiskLevel::High, IrrigationAction::Increase));
        assert_eq!(decide(25.0, None), (RiskLevel::Medium, IrrigationAction::Increase));
        assert_eq!(decide(85.0, None), (RiskLevel::High, IrrigationAction::Decrease));
        assert_eq!(decide(75.0, None), (RiskLevel::Medium, IrrigationAction::Decrease));
        assert_eq!(decide(50.0, None), (RiskLevel::Low, IrrigationAction::Maintain));
    }

    #[test]
    fn test_band_edges_fall_through() {
        assert_eq!(decide(20.0, None), (RiskLevel::Medium, IrrigationAction::Increase));
        assert_eq!(decide(30.0, None), (RiskLevel::Low, IrrigationAction::Maintain));
        assert_eq!(decide(80.0, None), (RiskLevel::Medium, IrrigationAction::Decrease));
        assert_eq!(decide(70.0, None), (RiskLevel::Low, IrrigationAction::Maintain));
    }

    #[test]
    fn test_high_evapotranspiration_on_dry_soil() {
        assert_eq!(decide(40.0, Some(6.0)), (RiskLevel::Medium, IrrigationAction::Increase));
        // Moist enough soil absorbs the evaporative demand
        assert_eq!(decide(55.0, Some(6.0)), (RiskLevel::Low, IrrigationAction::Maintain));
        assert_eq!(decide(40.0, Some(5.0)), (RiskLevel::Low, IrrigationAction::Maintain));

        let rec = generate_irrigation_recommendation(Some(40.0), Some(6.5), None, Utc::now()).unwrap();
        assert_eq!(rec.reason, "Alta evapotranspiración: 6.5mm/día");
        assert_eq!(rec.recommendation, IRRIGATION_EVAPORATION_MESSAGE);
    }

    #[test]
    fn test_reason_interpolates_moisture() {
        let rec = generate_irrigation_recommendation(Some(15.0), None, None, Utc::now()).unwrap();
        assert_eq!(rec.reason, "Humedad del suelo muy baja: 15%");
        assert_eq!(rec.recommendation, IRRIGATION_URGENT_MESSAGE);
        assert!(rec.id.starts_with("irrigation-"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_always_exactly_one_when_moisture_known(
            soil in 0.0f64..100.0,
            et in proptest::option::of(0.0f64..12.0),
        ) {
            let rec = generate_irrigation_recommendation(Some(soil), et, None, Utc::now());
            prop_assert!(rec.is_some());
        }
    }
}
