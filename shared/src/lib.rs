//! Shared types, models and analysis for the VitisGuard vineyard monitor
//!
//! This crate holds everything that does not touch the network or the disk,
//! so the CLI client and the WASM bindings evaluate advisories identically.

pub mod analysis;
pub mod models;
pub mod thresholds;
pub mod types;
pub mod validation;

pub use analysis::*;
pub use models::*;
pub use types::*;
pub use validation::*;
