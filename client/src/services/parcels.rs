//! Parcel registry persisted through a [`KeyValueStorage`]
//!
//! Storage never fails the caller: unreadable data loads as an empty list and
//! write failures are logged.

use validator::Validate;
use vitisguard_shared::{Parcel, ParcelUpdate};

use super::storage::KeyValueStorage;
use crate::error::{AppError, AppResult};

/// Storage key of the parcel list
pub const PARCELS_STORAGE_KEY: &str = "vitisguard_parcels";

/// Storage key of the selected parcel id
pub const SELECTED_PARCEL_STORAGE_KEY: &str = "vitisguard_selected_parcel";

pub struct ParcelStore<S: KeyValueStorage> {
    storage: S,
    parcels: Vec<Parcel>,
    selected: Option<String>,
}

impl<S: KeyValueStorage> ParcelStore<S> {
    /// Load the stored parcels; the stored selection is kept when it still
    /// names a parcel, otherwise the first parcel is selected
    pub fn load(storage: S) -> Self {
        let parcels: Vec<Parcel> = read_json(&storage, PARCELS_STORAGE_KEY).unwrap_or_default();
        let selected = read_json::<String>(&storage, SELECTED_PARCEL_STORAGE_KEY)
            .filter(|id| parcels.iter().any(|p| &p.id == id))
            .or_else(|| parcels.first().map(|p| p.id.clone()));

        tracing::debug!(count = parcels.len(), "Loaded parcels");
        Self {
            storage,
            parcels,
            selected,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }

    pub fn has_parcels(&self) -> bool {
        !self.parcels.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Parcel> {
        self.parcels.iter().find(|p| p.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Parcel> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    /// Add a parcel; an existing id is left untouched and yields `false`
    pub fn add(&mut self, parcel: Parcel) -> AppResult<bool> {
        parcel.validate()?;
        if self.get(&parcel.id).is_some() {
            tracing::debug!(id = %parcel.id, "Parcel already exists");
            return Ok(false);
        }

        if self.selected.is_none() {
            self.selected = Some(parcel.id.clone());
        }
        self.parcels.push(parcel);
        self.persist();
        Ok(true)
    }

    /// Remove a parcel; a removed selection moves to the first remaining one
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.parcels.len();
        self.parcels.retain(|p| p.id != id);
        if self.parcels.len() == before {
            return false;
        }

        if self.selected.as_deref() == Some(id) {
            self.selected = self.parcels.first().map(|p| p.id.clone());
        }
        self.persist();
        true
    }

    /// Apply a partial update; `false` when the id is unknown
    pub fn update(&mut self, id: &str, update: ParcelUpdate) -> AppResult<bool> {
        let Some(index) = self.parcels.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        let mut updated = self.parcels[index].clone();
        updated.apply(update);
        updated.validate()?;
        self.parcels[index] = updated;
        self.persist();
        Ok(true)
    }

    /// Select a parcel; unknown ids leave the selection unchanged
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        self.persist();
        true
    }

    /// Parcel by id, or the selection when no id is given
    pub fn resolve(&self, id: Option<&str>) -> AppResult<&Parcel> {
        match id {
            Some(id) => self
                .get(id)
                .ok_or_else(|| AppError::NotFound(format!("Parcel {}", id))),
            None => self
                .selected()
                .ok_or_else(|| AppError::NotFound("Selected parcel".to_string())),
        }
    }

    fn persist(&self) {
        write_json(&self.storage, PARCELS_STORAGE_KEY, &self.parcels);
        match &self.selected {
            Some(id) => write_json(&self.storage, SELECTED_PARCEL_STORAGE_KEY, id),
            None => {
                if let Err(e) = self.storage.remove(SELECTED_PARCEL_STORAGE_KEY) {
                    tracing::warn!(error = %e, "Failed to clear parcel selection");
                }
            }
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(storage: &impl KeyValueStorage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "Storage unavailable, starting empty");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding corrupt stored data");
            None
        }
    }
}

fn write_json<T: serde::Serialize + ?Sized>(storage: &impl KeyValueStorage, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|e| AppError::Storage(e.to_string()))
        .and_then(|json| storage.set(key, &json));
    if let Err(e) = result {
        tracing::warn!(key, error = %e, "Failed to persist");
    }
}
