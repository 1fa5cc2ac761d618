//! Persistence interface
//!
//! Each room persists two things between restarts: the smoothed model state
//! and its profile library. The engine talks to storage through
//! [`StateStore`]; `mrtop-store` provides a JSON file implementation and
//! [`MemoryStore`] covers tests and hosts that persist elsewhere.

use alloc::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::RoomId;
use crate::profile::ProfileManager;
use crate::thermal::ModelState;

/// Everything persisted for one room
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedRoom {
    /// Smoothed model state
    #[serde(default)]
    pub model_state: ModelState,
    /// Profile library and selection
    #[serde(default)]
    pub profiles: ProfileManager,
}

/// Key-value storage for per-room state
pub trait StateStore {
    /// Storage error
    type Error: core::fmt::Debug;

    /// Load a room's state; `Ok(None)` if nothing was stored yet
    fn load(&self, room: RoomId) -> Result<Option<PersistedRoom>, Self::Error>;

    /// Store a room's state, replacing any previous value
    fn save(&mut self, room: RoomId, state: &PersistedRoom) -> Result<(), Self::Error>;

    /// Remove a room's state
    fn remove(&mut self, room: RoomId) -> Result<(), Self::Error>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rooms: BTreeMap<RoomId, PersistedRoom>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl StateStore for MemoryStore {
    type Error = core::convert::Infallible;

    fn load(&self, room: RoomId) -> Result<Option<PersistedRoom>, Self::Error> {
        Ok(self.rooms.get(&room).cloned())
    }

    fn save(&mut self, room: RoomId, state: &PersistedRoom) -> Result<(), Self::Error> {
        self.rooms.insert(room, state.clone());
        Ok(())
    }

    fn remove(&mut self, room: RoomId) -> Result<(), Self::Error> {
        self.rooms.remove(&room);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load(RoomId(1)).unwrap(), None);

        let state = PersistedRoom {
            model_state: ModelState { mrt_prev: Some(19.5), ..ModelState::default() },
            ..PersistedRoom::default()
        };
        store.save(RoomId(1), &state).unwrap();
        assert_eq!(store.load(RoomId(1)).unwrap(), Some(state));

        store.remove(RoomId(1)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn older_documents_without_new_fields_still_load() {
        let json = r#"{ "model_state": { "mrt_prev": 20.1, "last_update_ts": 5 } }"#;
        let state: PersistedRoom = serde_json::from_str(json).unwrap();
        assert_eq!(state.model_state.mrt_prev, Some(20.1));
        assert_eq!(state.model_state.radiant_boost, 0.0);
        assert_eq!(state.profiles, ProfileManager::default());
    }
}
