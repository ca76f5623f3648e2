use std::fmt;

use serde::Serialize;
use sgp4::{Constants, Elements};
use utoipa::ToSchema;

use crate::sources::HexColor;

/// Deduplication key derived from the canonical element serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Builds the key from a canonical line by dropping the name-dependent
    /// prefix, i.e. everything up to and including the first comma.
    pub fn from_canonical(line: &str) -> Self {
        let body = line.split_once(',').map(|(_, rest)| rest).unwrap_or(line);
        IdentityKey(body.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which feed a record came from, for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SourceTag {
    pub id: String,
    pub label: String,
    pub color: HexColor,
}

/// One satellite body in the catalog.
#[derive(Clone)]
pub struct OrbitalRecord {
    pub name: String,
    pub catalog_number: String,
    pub international_designator: String,
    pub identity: IdentityKey,
    pub elements: Elements,
    pub constants: Constants,
    pub source: SourceTag,
    pub picked: bool,
}

impl OrbitalRecord {
    pub fn display_color(&self) -> &HexColor {
        &self.source.color
    }
}

/// Serializes the orbital elements into a normalized comma separated line,
/// prefixed with the object name.
pub fn canonical_line(name: &str, elements: &Elements) -> String {
    format!(
        "{},{},{},{},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8e},{:.8e},{:.8e},{}",
        name.replace(',', " "),
        elements.norad_id,
        elements.international_designator.as_deref().unwrap_or(""),
        elements.datetime.format("%Y-%m-%dT%H:%M:%S%.6f"),
        elements.inclination,
        elements.right_ascension,
        elements.eccentricity,
        elements.argument_of_perigee,
        elements.mean_anomaly,
        elements.mean_motion,
        elements.mean_motion_dot,
        elements.mean_motion_ddot,
        elements.drag_term,
        elements.revolution_number,
    )
}
