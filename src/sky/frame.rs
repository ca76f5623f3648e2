use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::IdentityKey;
use crate::sources::HexColor;

/// One visible body in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FrameEntry {
    pub plot_index: usize,
    pub catalog_index: usize,
    pub identity: IdentityKey,
    pub name: String,
    pub catalog_number: String,
    pub source: String,
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    pub right_ascension_deg: f64,
    pub declination_deg: f64,
    /// Azimuth in radians, clockwise from north.
    pub theta: f64,
    /// cos(altitude): 0 at zenith, 1 on the horizon.
    pub radius: f64,
    pub color: HexColor,
    pub picked: bool,
}

/// Render-ready snapshot of everything above the horizon at one instant.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Frame {
    pub seq: u64,
    pub instant: Option<DateTime<Utc>>,
    pub entries: Vec<FrameEntry>,
}

/// Column-wise view of a frame, the shape scatter plots consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PlotArrays {
    pub theta: Vec<f64>,
    pub radius: Vec<f64>,
    pub color: Vec<HexColor>,
    pub picked: Vec<bool>,
}

impl Frame {
    pub fn entry(&self, plot_index: usize) -> Option<&FrameEntry> {
        self.entries.get(plot_index)
    }

    pub fn find(&self, identity: &IdentityKey) -> Option<&FrameEntry> {
        self.entries.iter().find(|e| &e.identity == identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn plot_arrays(&self) -> PlotArrays {
        let mut arrays = PlotArrays::default();
        for entry in &self.entries {
            arrays.theta.push(entry.theta);
            arrays.radius.push(entry.radius);
            arrays.color.push(entry.color.clone());
            arrays.picked.push(entry.picked);
        }
        arrays
    }
}
