//! WebAssembly bindings for VitisGuard
//!
//! Provides in-browser advisory evaluation for:
//! - Disease risk scoring
//! - Weather alerts and irrigation guidance
//! - Full forecast analysis
//!
//! Inputs and outputs cross the boundary as JSON strings.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vitisguard_shared::thresholds::classify_risk_level;
use vitisguard_shared::{
    analyze_conditions, analyze_response, evaluate_disease, generate_irrigation_recommendation,
    AnalysisContext, DiseaseType, Recommendations, WeatherConditions, WeatherResponse,
};
use wasm_bindgen::prelude::*;

/// Conditions snapshot plus the context the evaluators need
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest {
    conditions: WeatherConditions,
    #[serde(default)]
    days_without_rain: u32,
    evapotranspiration: Option<f64>,
}

/// Run every evaluator on a conditions snapshot; returns the advisories,
/// most severe first, as JSON
#[wasm_bindgen]
pub fn analyze_conditions_json(request_json: &str) -> Result<String, JsValue> {
    analyze_request(request_json, now()).map_err(|e| reject(&e))
}

/// Analyze a raw forecast response
#[wasm_bindgen]
pub fn analyze_forecast_json(response_json: &str) -> Result<String, JsValue> {
    analyze_forecast(response_json, now()).map_err(|e| reject(&e))
}

/// Score one disease by name against a conditions snapshot
#[wasm_bindgen]
pub fn evaluate_disease_json(disease: &str, conditions_json: &str) -> Result<String, JsValue> {
    disease_risk(disease, conditions_json, now()).map_err(|e| reject(&e))
}

/// Risk band name for a probability percentage
#[wasm_bindgen]
pub fn classify_risk(probability: u8) -> String {
    classify_risk_level(probability.min(100)).to_string()
}

/// Irrigation action for a soil moisture reading, or `None` when unknown
#[wasm_bindgen]
pub fn irrigation_action(soil_moisture: f64, evapotranspiration: Option<f64>) -> Option<String> {
    generate_irrigation_recommendation(Some(soil_moisture), evapotranspiration, None, now())
        .map(|recommendation| recommendation.action.to_string())
}

fn analyze_request(request_json: &str, now: DateTime<Utc>) -> Result<String, String> {
    let request: AnalysisRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid analysis request JSON: {}", e))?;
    let context = AnalysisContext {
        days_without_rain: request.days_without_rain,
        evapotranspiration: request.evapotranspiration,
        now,
    };
    prioritized_json(analyze_conditions(&request.conditions, &context))
}

fn analyze_forecast(response_json: &str, now: DateTime<Utc>) -> Result<String, String> {
    let response: WeatherResponse = serde_json::from_str(response_json)
        .map_err(|e| format!("Invalid forecast JSON: {}", e))?;
    prioritized_json(analyze_response(&response, now))
}

fn disease_risk(disease: &str, conditions_json: &str, now: DateTime<Utc>) -> Result<String, String> {
    let conditions: WeatherConditions = serde_json::from_str(conditions_json)
        .map_err(|e| format!("Invalid conditions JSON: {}", e))?;
    let risk = evaluate_disease(&DiseaseType::from(disease), &conditions, now);
    serde_json::to_string(&risk).map_err(|e| e.to_string())
}

fn prioritized_json(batch: Vec<vitisguard_shared::Advisory>) -> Result<String, String> {
    let mut recommendations = Recommendations::new();
    recommendations.set_recommendations(batch);
    serde_json::to_string(&recommendations.prioritized(None)).map_err(|e| e.to_string())
}

fn reject(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    JsValue::from_str(message)
}

/// Evaluation instant from the host clock
fn now() -> DateTime<Utc> {
    #[cfg(target_arch = "wasm32")]
    {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn july() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_classify_risk() {
        assert_eq!(classify_risk(0), "low");
        assert_eq!(classify_risk(45), "medium");
        assert_eq!(classify_risk(70), "high");
        assert_eq!(classify_risk(90), "critical");
        assert_eq!(classify_risk(250), "critical");
    }

    #[test]
    fn test_irrigation_action() {
        assert_eq!(irrigation_action(15.0, None).as_deref(), Some("increase"));
        assert_eq!(irrigation_action(85.0, None).as_deref(), Some("decrease"));
        assert_eq!(irrigation_action(50.0, Some(2.0)).as_deref(), Some("maintain"));
        assert_eq!(irrigation_action(f64::NAN, None), None);
    }

    #[test]
    fn test_analyze_request_is_prioritized() {
        let request = r#"{
            "conditions": { "temperature": -6.0, "soilMoisture": 50.0 },
            "daysWithoutRain": 0
        }"#;
        let output: Value = serde_json::from_str(&analyze_request(request, july()).unwrap()).unwrap();
        let advisories = output.as_array().unwrap();

        assert_eq!(advisories[0]["category"], "weather");
        assert_eq!(advisories[0]["level"], "critical");
        assert_eq!(advisories.last().unwrap()["level"], "low");
    }

    #[test]
    fn test_analyze_request_rejects_bad_json() {
        let error = analyze_request("{", july()).unwrap_err();
        assert!(error.starts_with("Invalid analysis request JSON"));
    }

    #[test]
    fn test_analyze_forecast_without_data() {
        let output = analyze_forecast(r#"{"latitude": 42.4, "longitude": -2.4}"#, july()).unwrap();
        let advisories: Vec<Value> = serde_json::from_str(&output).unwrap();
        // Only the four disease scores; no alert or irrigation inputs
        assert_eq!(advisories.len(), 4);
    }

    #[test]
    fn test_disease_risk_for_unknown_name() {
        let output = disease_risk("phylloxera", "{}", july()).unwrap();
        let risk: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(risk["disease"], "phylloxera");
        assert_eq!(risk["probability"], 0);
        assert_eq!(risk["level"], "low");
    }

    #[test]
    fn test_disease_risk_for_mildew_weather() {
        let conditions = r#"{"temperature": 20.0, "humidity": 95.0, "precipitation": 8.0}"#;
        let output = disease_risk("mildiu", conditions, july()).unwrap();
        let risk: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(risk["level"], "critical");
    }
}
