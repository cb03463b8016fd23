//! Weather data models
//!
//! Mirrors the Open-Meteo forecast payload: every series is optional and every
//! sample inside a series may be null.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a variable name is not one of the recognized enumerations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown weather variable: {0}")]
pub struct UnknownVariable(pub String);

macro_rules! weather_variables {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every recognized variable, in request order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name used on the wire
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariable;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariable(other.to_string())),
                }
            }
        }
    };
}

weather_variables! {
    /// Hourly series the forecast endpoint can return
    HourlyVariable {
        Temperature2m => "temperature_2m",
        RelativeHumidity2m => "relative_humidity_2m",
        Precipitation => "precipitation",
        Rain => "rain",
        Showers => "showers",
        SoilMoisture0To7cm => "soil_moisture_0_to_7cm",
        SoilMoisture7To28cm => "soil_moisture_7_to_28cm",
        SoilTemperature0To7cm => "soil_temperature_0_to_7cm",
        SoilTemperature7To28cm => "soil_temperature_7_to_28cm",
        WindSpeed10m => "wind_speed_10m",
        WindGusts10m => "wind_gusts_10m",
        WindDirection10m => "wind_direction_10m",
        ShortwaveRadiation => "shortwave_radiation",
        DirectRadiation => "direct_radiation",
        DiffuseRadiation => "diffuse_radiation",
        SunshineDuration => "sunshine_duration",
        Et0FaoEvapotranspiration => "et0_fao_evapotranspiration",
        Snowfall => "snowfall",
        SnowDepth => "snow_depth",
        UvIndex => "uv_index",
    }
}

weather_variables! {
    /// Daily aggregates the forecast endpoint can return
    DailyVariable {
        Temperature2mMax => "temperature_2m_max",
        Temperature2mMin => "temperature_2m_min",
        Temperature2mMean => "temperature_2m_mean",
        PrecipitationSum => "precipitation_sum",
        RainSum => "rain_sum",
        ShowersSum => "showers_sum",
        WindSpeed10mMax => "wind_speed_10m_max",
        WindGusts10mMax => "wind_gusts_10m_max",
        WindDirection10mDominant => "wind_direction_10m_dominant",
        ShortwaveRadiationSum => "shortwave_radiation_sum",
        SunshineDuration => "sunshine_duration",
        Et0FaoEvapotranspiration => "et0_fao_evapotranspiration",
        SnowfallSum => "snowfall_sum",
        UvIndexMax => "uv_index_max",
        RelativeHumidity2mMin => "relative_humidity_2m_min",
    }
}

weather_variables! {
    /// Current-instant fields
    CurrentVariable {
        Temperature2m => "temperature_2m",
        RelativeHumidity2m => "relative_humidity_2m",
        ApparentTemperature => "apparent_temperature",
        Precipitation => "precipitation",
        Rain => "rain",
        WindSpeed10m => "wind_speed_10m",
        WindDirection10m => "wind_direction_10m",
        WindGusts10m => "wind_gusts_10m",
    }
}

/// Default forecast window in days
pub const DEFAULT_FORECAST_DAYS: u32 = 7;

/// Request options for a forecast call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherOptions {
    #[serde(default)]
    pub hourly: Vec<HourlyVariable>,
    #[serde(default)]
    pub daily: Vec<DailyVariable>,
    pub forecast_days: u32,
    pub past_days: u32,
}

impl Default for WeatherOptions {
    fn default() -> Self {
        Self {
            hourly: Vec::new(),
            daily: Vec::new(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            past_days: 0,
        }
    }
}

impl WeatherOptions {
    /// Options requesting every recognized hourly and daily variable
    pub fn all_variables() -> Self {
        Self {
            hourly: HourlyVariable::ALL.to_vec(),
            daily: DailyVariable::ALL.to_vec(),
            ..Self::default()
        }
    }

    pub fn hourly_param(&self) -> String {
        join_names(self.hourly.iter().map(|v| v.as_str()))
    }

    pub fn daily_param(&self) -> String {
        join_names(self.daily.iter().map(|v| v.as_str()))
    }
}

/// Comma-join variable names for a query parameter
pub fn join_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(",")
}

/// A time series column; absent samples are null on the wire
pub type Series = Option<Vec<Option<f64>>>;

/// Hourly block of a forecast response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyData {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity_2m: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showers: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snowfall: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow_depth: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture_0_to_7cm: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture_7_to_28cm: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_temperature_0_to_7cm: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_temperature_7_to_28cm: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_10m: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gusts_10m: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortwave_radiation: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_radiation: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diffuse_radiation: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunshine_duration: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub et0_fao_evapotranspiration: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Series,
}

impl HourlyData {
    /// Index of the last slot at or before `reference` (ISO `YYYY-MM-DDTHH:MM`)
    pub fn index_at(&self, reference: &str) -> Option<usize> {
        self.time.iter().rposition(|slot| slot.as_str() <= reference)
    }
}

/// Daily block of a forecast response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyData {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m_max: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m_min: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m_mean: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_sum: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_sum: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showers_sum: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snowfall_sum: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_10m_max: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gusts_10m_max: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m_dominant: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortwave_radiation_sum: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunshine_duration: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub et0_fao_evapotranspiration: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index_max: Series,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity_2m_min: Series,
}

/// Current-instant block of a forecast response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentData {
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_10m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gusts_10m: Option<f64>,
}

/// Full forecast response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub timezone_abbreviation: String,
    #[serde(default)]
    pub generationtime_ms: f64,
    #[serde(default)]
    pub hourly: HourlyData,
    #[serde(default)]
    pub daily: DailyData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentData>,
}

/// First sample of a series, if present and not null
pub fn first_sample(series: &Series) -> Option<f64> {
    series.as_ref().and_then(|values| values.first().copied().flatten())
}

/// Sample at `index`, if present and not null
pub fn sample_at(series: &Series, index: usize) -> Option<f64> {
    series
        .as_ref()
        .and_then(|values| values.get(index).copied().flatten())
}

/// Scalar snapshot the evaluators work from; every field may be unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditions {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub soil_temperature: Option<f64>,
    pub sunshine_hours: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl WeatherConditions {
    /// Current-instant fields plus the first hourly sample of the soil and
    /// sunshine series
    pub fn extract(current: Option<&CurrentData>, hourly: Option<&HourlyData>) -> Self {
        Self::extract_at(current, hourly, 0)
    }

    /// Like [`extract`](Self::extract), reading the hourly series at `index`
    pub fn extract_at(
        current: Option<&CurrentData>,
        hourly: Option<&HourlyData>,
        index: usize,
    ) -> Self {
        Self {
            temperature: current.and_then(|c| c.temperature_2m),
            humidity: current.and_then(|c| c.relative_humidity_2m),
            precipitation: current.and_then(|c| c.precipitation),
            soil_moisture: hourly.and_then(|h| sample_at(&h.soil_moisture_0_to_7cm, index)),
            soil_temperature: hourly.and_then(|h| sample_at(&h.soil_temperature_0_to_7cm, index)),
            sunshine_hours: hourly.and_then(|h| sample_at(&h.sunshine_duration, index)),
            wind_speed: current.and_then(|c| c.wind_speed_10m),
        }
    }

    /// True when every field is unknown
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
