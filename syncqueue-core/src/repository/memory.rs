use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};

use super::RoomStore;
use crate::{
    models::{Room, RoomId, UserId},
    Error, Result,
};

/// In-process room store.
///
/// Each save runs under the map's per-entry lock, so compare and swap happen
/// atomically for one room while other rooms proceed in parallel.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    rooms: DashMap<RoomId, Room>,
}

impl MemoryRoomStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn create(&self, mut room: Room) -> Result<Room> {
        match self.rooms.entry(room.id.clone()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(format!("Room {} already exists", room.id))),
            Entry::Vacant(slot) => {
                room.version = 1;
                slot.insert(room.clone());
                Ok(room)
            }
        }
    }

    async fn load(&self, room_id: &RoomId) -> Result<Room> {
        self.rooms
            .get(room_id)
            .map(|room| room.value().clone())
            .ok_or(Error::RoomNotFound)
    }

    async fn save(&self, mut room: Room, expected_version: i64) -> Result<Room> {
        let mut stored = self.rooms.get_mut(&room.id).ok_or(Error::RoomNotFound)?;
        if stored.version != expected_version {
            return Err(Error::VersionConflict);
        }

        room.version = expected_version + 1;
        room.updated_at = Utc::now();
        *stored = room.clone();
        Ok(room)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Room>> {
        let mut rooms: Vec<Room> = self
            .rooms
            .iter()
            .filter(|entry| &entry.created_by == user_id || entry.is_member(user_id))
            .map(|entry| entry.value().clone())
            .collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms)
    }
}
