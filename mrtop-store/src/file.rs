//! One JSON document per room

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use mrtop_core::{PersistedRoom, RoomId, StateStore};

use crate::StoreError;

/// Directory-backed state store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store in `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Document path for a room
    pub fn path_for(&self, room: RoomId) -> PathBuf {
        self.dir.join(format!("room-{}.json", room.0))
    }

    fn temp_path_for(&self, room: RoomId) -> PathBuf {
        self.dir.join(format!(".room-{}.json.tmp", room.0))
    }
}

impl StateStore for JsonFileStore {
    type Error = StoreError;

    fn load(&self, room: RoomId) -> Result<Option<PersistedRoom>, StoreError> {
        let bytes = match fs::read(self.path_for(room)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&mut self, room: RoomId, state: &PersistedRoom) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(state)?;
        let tmp = self.temp_path_for(room);
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.path_for(room))?;
        log::debug!("stored {} ({} bytes)", room, body.len());
        Ok(())
    }

    fn remove(&mut self, room: RoomId) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(room)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
