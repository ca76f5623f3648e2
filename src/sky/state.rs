use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::{Catalog, IdentityKey};
use crate::sky::frame::Frame;

/// Everything the tick loop and the interaction handlers share. One lock
/// covers building and publishing a frame and every picked-state change.
pub struct SkyState {
    pub catalog: Catalog,
    pub frame: Frame,
    pub tracked: Vec<IdentityKey>,
}

pub type SharedSky = Arc<Mutex<SkyState>>;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrackedBody {
    pub identity: IdentityKey,
    pub name: String,
    pub catalog_number: String,
    pub source: String,
    pub visible: bool,
    pub azimuth_deg: Option<f64>,
    pub altitude_deg: Option<f64>,
}

impl SkyState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            frame: Frame::default(),
            tracked: Vec::new(),
        }
    }

    pub fn shared(catalog: Catalog) -> SharedSky {
        Arc::new(Mutex::new(Self::new(catalog)))
    }

    /// Tracked bodies in pick order, with their position in the current
    /// frame when visible.
    pub fn tracked_bodies(&self) -> Vec<TrackedBody> {
        self.tracked
            .iter()
            .filter_map(|key| {
                let record = self.catalog.by_identity(key)?;
                let entry = self.frame.find(key);
                Some(TrackedBody {
                    identity: key.clone(),
                    name: record.name.clone(),
                    catalog_number: record.catalog_number.clone(),
                    source: record.source.label.clone(),
                    visible: entry.is_some(),
                    azimuth_deg: entry.map(|e| e.azimuth_deg),
                    altitude_deg: entry.map(|e| e.altitude_deg),
                })
            })
            .collect()
    }
}

/// Locks the shared state. A panic while holding the lock leaves the data
/// usable, so poisoning is ignored.
pub fn lock(sky: &SharedSky) -> MutexGuard<'_, SkyState> {
    sky.lock().unwrap_or_else(PoisonError::into_inner)
}
