//! VitisGuard client
//!
//! Fetches forecasts for tracked vineyard parcels, keeps them fresh and turns
//! them into prioritized disease, weather and irrigation advisories.

pub mod config;
pub mod error;
pub mod external;
pub mod report;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
