//! Client services: fetch orchestration and parcel persistence

pub mod orchestrator;
pub mod parcels;
pub mod storage;

pub use orchestrator::{FetchPolicy, FetchState, FetchStatus, WeatherOrchestrator};
pub use parcels::ParcelStore;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
