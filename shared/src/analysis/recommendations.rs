//! Recommendation aggregation and the weather analysis pipeline

use std::collections::HashSet;

use chrono::{DateTime, Timelike, Utc};

use super::{evaluate_all_diseases, generate_irrigation_recommendation, generate_weather_alerts};
use crate::models::{
    sample_at, Advisory, AdvisoryCategory, CurrentData, DailyData, HourlyData, WeatherConditions,
    WeatherResponse,
};
use crate::thresholds::DRY_DAY_PRECIPITATION;
use crate::types::RiskLevel;

// ============================================================================
// Aggregator
// ============================================================================

/// Latest advisory batch plus the ids the user dismissed.
///
/// Dismissal is by id membership. Ids are regenerated on every evaluation, so
/// a dismissal only hides advisories of the batch it was made against.
#[derive(Debug, Clone, Default)]
pub struct Recommendations {
    batch: Vec<Advisory>,
    dismissed: HashSet<String>,
}

impl Recommendations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current batch
    pub fn set_recommendations(&mut self, batch: Vec<Advisory>) {
        self.batch = batch;
    }

    pub fn all(&self) -> &[Advisory] {
        &self.batch
    }

    /// Batch minus dismissed advisories, in batch order
    pub fn active(&self) -> Vec<&Advisory> {
        self.batch
            .iter()
            .filter(|advisory| !self.dismissed.contains(advisory.id()))
            .collect()
    }

    /// Active advisories, most severe first; ties keep batch order.
    /// `Some(0)` is treated as no limit.
    pub fn prioritized(&self, limit: Option<usize>) -> Vec<&Advisory> {
        let mut active = self.active();
        // sort_by_key is stable
        active.sort_by_key(|advisory| advisory.level().priority());
        // Zero means no limit
        if let Some(limit) = limit.filter(|&limit| limit > 0) {
            active.truncate(limit);
        }
        active
    }

    pub fn critical(&self) -> Vec<&Advisory> {
        self.active()
            .into_iter()
            .filter(|advisory| advisory.level() == RiskLevel::Critical)
            .collect()
    }

    pub fn by_category(&self, category: AdvisoryCategory) -> Vec<&Advisory> {
        self.active()
            .into_iter()
            .filter(|advisory| advisory.category() == category)
            .collect()
    }

    pub fn dismiss(&mut self, id: impl Into<String>) {
        self.dismissed.insert(id.into());
    }

    pub fn clear_dismissed(&mut self) {
        self.dismissed.clear();
    }

    pub fn has_critical(&self) -> bool {
        !self.critical().is_empty()
    }

    pub fn has_alerts(&self) -> bool {
        self.alert_count() > 0
    }

    pub fn alert_count(&self) -> usize {
        self.active().len()
    }
}

// ============================================================================
// Analysis Pipeline
// ============================================================================

/// Inputs to the evaluators that are not part of the instantaneous conditions
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext {
    pub days_without_rain: u32,
    pub evapotranspiration: Option<f64>,
    pub now: DateTime<Utc>,
}

impl AnalysisContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            days_without_rain: 0,
            evapotranspiration: None,
            now,
        }
    }
}

/// Run every evaluator on a conditions snapshot.
///
/// Output order: disease risks, weather alerts, then the irrigation
/// recommendation when soil moisture is known.
pub fn analyze_conditions(conditions: &WeatherConditions, context: &AnalysisContext) -> Vec<Advisory> {
    let mut advisories: Vec<Advisory> = evaluate_all_diseases(conditions, context.now)
        .into_iter()
        .map(Advisory::from)
        .collect();

    advisories.extend(
        generate_weather_alerts(
            conditions.temperature,
            conditions.humidity,
            conditions.precipitation,
            conditions.wind_speed,
            context.days_without_rain,
            context.now,
        )
        .into_iter()
        .map(Advisory::from),
    );

    if let Some(irrigation) = generate_irrigation_recommendation(
        conditions.soil_moisture,
        context.evapotranspiration,
        conditions.precipitation,
        context.now,
    ) {
        advisories.push(irrigation.into());
    }

    advisories
}

/// Extract conditions from the raw blocks and analyze them
pub fn analyze_weather(
    current: Option<&CurrentData>,
    hourly: Option<&HourlyData>,
    context: &AnalysisContext,
) -> Vec<Advisory> {
    analyze_conditions(&WeatherConditions::extract(current, hourly), context)
}

/// Evaluation context derived from a response's daily block: the dry streak
/// ending today and today's reference evapotranspiration
pub fn response_context(response: &WeatherResponse, now: DateTime<Utc>) -> AnalysisContext {
    let today = today_index(&response.daily, now);
    AnalysisContext {
        days_without_rain: today
            .map(|index| days_without_rain(&response.daily, index))
            .unwrap_or(0),
        evapotranspiration: today
            .and_then(|index| sample_at(&response.daily.et0_fao_evapotranspiration, index)),
        now,
    }
}

/// Conditions at the current hour: the current block plus the hourly sample
/// matching `current.time` (or `now` when the block is missing).
///
/// Without hourly timestamps the slot is derived from the daily index of
/// today, falling back to the first sample when that slot does not exist.
pub fn response_conditions(response: &WeatherResponse, now: DateTime<Utc>) -> WeatherConditions {
    let current = response.current.as_ref();
    let index = current_hour_index(response, now);
    WeatherConditions::extract_at(current, Some(&response.hourly), index)
}

fn current_hour_index(response: &WeatherResponse, now: DateTime<Utc>) -> usize {
    let hourly = &response.hourly;
    if !hourly.time.is_empty() {
        let reference = match response.current.as_ref() {
            Some(current) if !current.time.is_empty() => current.time.clone(),
            _ => now.format("%Y-%m-%dT%H:%M").to_string(),
        };
        return hourly.index_at(&reference).unwrap_or(0);
    }

    let samples = hourly
        .soil_moisture_0_to_7cm
        .as_ref()
        .map(Vec::len)
        .unwrap_or(0);
    today_index(&response.daily, now)
        .map(|day| day * 24 + now.hour() as usize)
        .filter(|&index| index < samples)
        .unwrap_or(0)
}

/// Analyze a response at its current hour in the given context
pub fn analyze_response_in(
    response: &WeatherResponse,
    context: &AnalysisContext,
) -> Vec<Advisory> {
    analyze_conditions(&response_conditions(response, context.now), context)
}

/// Analyze a full response in its derived context
pub fn analyze_response(response: &WeatherResponse, now: DateTime<Utc>) -> Vec<Advisory> {
    analyze_response_in(response, &response_context(response, now))
}

/// Index of the last daily entry on or before the current UTC date
fn today_index(daily: &DailyData, now: DateTime<Utc>) -> Option<usize> {
    let today = now.date_naive().format("%Y-%m-%d").to_string();
    daily
        .time
        .iter()
        .rposition(|day| day.as_str() <= today.as_str())
}

/// Consecutive dry days ending at `index`, counted backwards.
///
/// A missing sample ends the streak.
pub fn days_without_rain(daily: &DailyData, index: usize) -> u32 {
    let mut days = 0;
    for day in (0..=index).rev() {
        match sample_at(&daily.precipitation_sum, day) {
            Some(rain) if rain < DRY_DAY_PRECIPITATION => days += 1,
            _ => break,
        }
    }
    days
}
