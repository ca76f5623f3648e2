use std::collections::HashMap;

use crate::catalog::record::{IdentityKey, OrbitalRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    Appended(usize),
    Replaced(usize),
}

/// Ordered, deduplicated set of tracked bodies.
#[derive(Default)]
pub struct Catalog {
    records: Vec<OrbitalRecord>,
    index: HashMap<IdentityKey, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, or replaces the entry with the same identity in place.
    /// A replacement starts unpicked.
    pub fn ingest(&mut self, mut record: OrbitalRecord) -> Ingested {
        record.picked = false;
        match self.index.get(&record.identity) {
            Some(&idx) => {
                self.records[idx] = record;
                Ingested::Replaced(idx)
            }
            None => {
                let idx = self.records.len();
                self.index.insert(record.identity.clone(), idx);
                self.records.push(record);
                Ingested::Appended(idx)
            }
        }
    }

    pub fn all(&self) -> &[OrbitalRecord] {
        &self.records
    }

    pub fn find_by_identity(&self, key: &IdentityKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn by_identity(&self, key: &IdentityKey) -> Option<&OrbitalRecord> {
        self.find_by_identity(key).map(|idx| &self.records[idx])
    }

    /// Sets the picked flag, returning false when the identity is unknown.
    pub fn set_picked(&mut self, key: &IdentityKey, picked: bool) -> bool {
        match self.find_by_identity(key) {
            Some(idx) => {
                self.records[idx].picked = picked;
                true
            }
            None => false,
        }
    }

    pub fn clear_picks(&mut self) {
        for record in &mut self.records {
            record.picked = false;
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
