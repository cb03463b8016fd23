//! External API integrations

pub mod weather;

pub use weather::{WeatherApiError, WeatherClient, WeatherFetcher};
