use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sources::types::SourceDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Freshness {
    pub etag: Option<String>,
    pub size: Option<u64>,
}

/// Entity tag and size per source name, persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreshnessStore {
    #[serde(default)]
    pub sources: BTreeMap<String, Freshness>,
}

impl FreshnessStore {
    /// A missing or unreadable store just means everything is re-checked.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                return Self::default();
            }
        };
        serde_yaml::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt freshness file {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(
            path,
            serde_yaml::to_string(self)
                .map_err(|e| io::Error::other(format!("Failed to serialize freshness: {}", e)))?,
        )
    }

    /// Fills in tag and size for descriptors the manifest left blank.
    pub fn apply(&self, sources: &mut [SourceDescriptor]) {
        for source in sources {
            if let Some(saved) = self.sources.get(&source.name) {
                if source.etag.is_none() {
                    source.etag = saved.etag.clone();
                }
                if source.size.is_none() {
                    source.size = saved.size;
                }
            }
        }
    }

    pub fn record(&mut self, sources: &[SourceDescriptor]) {
        for source in sources {
            self.sources.insert(
                source.name.clone(),
                Freshness {
                    etag: source.etag.clone(),
                    size: source.size,
                },
            );
        }
    }
}
