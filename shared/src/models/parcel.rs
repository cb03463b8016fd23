//! Vineyard parcel models

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::types::WeatherLocation;
use crate::validation::{validate_latitude, validate_longitude};

/// A user-tracked vineyard plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_parcel_coordinates", skip_on_field_errors = false))]
pub struct Parcel {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

fn validate_parcel_coordinates(parcel: &Parcel) -> Result<(), ValidationError> {
    validate_latitude(parcel.latitude).map_err(ValidationError::new)?;
    validate_longitude(parcel.longitude).map_err(ValidationError::new)?;
    Ok(())
}

impl Parcel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn location(&self) -> WeatherLocation {
        WeatherLocation::new(self.latitude, self.longitude)
    }

    /// Apply a partial update; the id never changes
    pub fn apply(&mut self, update: ParcelUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(latitude) = update.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = update.longitude {
            self.longitude = longitude;
        }
    }
}

/// Partial update for a parcel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelUpdate {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parcel_validation() {
        let parcel = Parcel::new("p1", "Viña Norte", 42.46, -2.45);
        assert!(parcel.validate().is_ok());

        let out_of_range = Parcel::new("p2", "Nowhere", 91.0, 0.0);
        assert!(out_of_range.validate().is_err());

        let unnamed = Parcel::new("p3", "", 10.0, 10.0);
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_parcel_partial_update_keeps_id() {
        let mut parcel = Parcel::new("p1", "Viña Norte", 42.46, -2.45);
        parcel.apply(ParcelUpdate {
            name: Some("Viña Sur".to_string()),
            ..ParcelUpdate::default()
        });

        assert_eq!(parcel.id, "p1");
        assert_eq!(parcel.name, "Viña Sur");
        assert_eq!(parcel.latitude, 42.46);
    }
}
