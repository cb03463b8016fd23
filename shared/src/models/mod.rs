//! Domain models for the VitisGuard vineyard monitor

mod advisory;
mod disease;
mod parcel;
mod weather;

pub use advisory::*;
pub use disease::*;
pub use parcel::*;
pub use weather::*;
