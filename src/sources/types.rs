use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::SourceTag;

/// `#rrggbb` color, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.trim().strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        Some(HexColor(format!("#{}", expanded.to_ascii_lowercase())))
    }

    pub fn white() -> Self {
        HexColor("#ffffff".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value).ok_or_else(|| format!("invalid hex color: {}", value))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named remote TLE feed plus what we last saw of it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
    pub file: String,
    #[serde(default = "HexColor::white")]
    pub color: HexColor,
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl SourceDescriptor {
    pub fn new(name: &str, url: &str, file: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            file: file.to_string(),
            color: HexColor::parse(color).unwrap_or_else(HexColor::white),
            etag: None,
            size: None,
        }
    }

    pub fn tag(&self) -> SourceTag {
        SourceTag {
            id: self.file.clone(),
            label: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Remote changed (or nothing was cached); body downloaded.
    Fresh,
    /// Remote tag and size match the cached copy.
    Current,
    /// Remote unreachable; serving the cached copy.
    Stale,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub path: PathBuf,
    pub status: CacheStatus,
}
