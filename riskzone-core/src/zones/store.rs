//! Authoritative in-memory zone collection
//!
//! Owned by the sync hub actor; nothing else writes to it, so there is no
//! interior locking here.

use chrono::Utc;
use std::collections::HashSet;

use super::model::{AcceptedZone, Zone, ZoneId};

#[derive(Debug, Default)]
pub struct ZoneStore {
    zones: Vec<Zone>,
    ids: HashSet<ZoneId>,
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a validated zone, assigning its id and creation time.
    pub fn append(&mut self, accepted: AcceptedZone) -> Zone {
        let mut id = ZoneId::generate();
        while self.ids.contains(&id) {
            id = ZoneId::generate();
        }

        let zone = Zone {
            id: id.clone(),
            shape: accepted.shape,
            coordinates: accepted.coordinates,
            risk: accepted.risk,
            created_at: Utc::now(),
        };

        self.ids.insert(id);
        self.zones.push(zone.clone());
        zone
    }

    /// All zones in insertion order
    pub fn all(&self) -> &[Zone] {
        &self.zones
    }

    /// Drop every zone, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let cleared = self.zones.len();
        self.zones.clear();
        self.ids.clear();
        cleared
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
