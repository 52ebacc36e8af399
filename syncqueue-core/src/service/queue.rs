//! Queue rules: enqueue, remove and owner reordering of pending tracks

use chrono::{DateTime, Utc};

use crate::{
    config::RoomConfig,
    models::{Room, SourceId, Track, UserId},
    Error, Result,
};

#[derive(Debug, Clone)]
pub struct QueueManager {
    max_queue_len: usize,
}

impl QueueManager {
    #[must_use]
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            max_queue_len: config.max_queue_len,
        }
    }

    /// Append a track requested by `user_id` to the end of the queue.
    ///
    /// Handles exactly one request; ordering between concurrent requests is
    /// settled by the service's save retry, not here.
    pub fn enqueue(
        &self,
        room: &Room,
        user_id: &UserId,
        source_id: &SourceId,
        now: DateTime<Utc>,
    ) -> Result<Room> {
        ensure_member(room, user_id)?;
        if room.queue_position(source_id).is_some() {
            return Err(Error::DuplicateTrack(source_id.to_string()));
        }
        if room.queue.len() >= self.max_queue_len {
            return Err(Error::InvalidInput(format!(
                "Queue is full ({} tracks)",
                self.max_queue_len
            )));
        }

        let mut next = room.clone();
        next.queue.push(Track::new(source_id.clone(), user_id.clone(), now));
        Ok(next)
    }

    /// Drop a pending track. Allowed for whoever requested it and for the owner.
    pub fn remove(&self, room: &Room, user_id: &UserId, source_id: &SourceId) -> Result<Room> {
        ensure_member(room, user_id)?;
        let index = room
            .queue_position(source_id)
            .ok_or_else(|| Error::TrackNotFound(source_id.to_string()))?;

        if &room.queue[index].requested_by != user_id && !room.is_owner(user_id) {
            return Err(Error::NotAuthorized(
                "Only the requester or the room owner can remove a track".to_string(),
            ));
        }

        let mut next = room.clone();
        next.queue.remove(index);
        Ok(next)
    }

    /// Move a pending track to `to_index`, clamped to the queue bounds. Owner only.
    pub fn reorder(
        &self,
        room: &Room,
        user_id: &UserId,
        source_id: &SourceId,
        to_index: usize,
    ) -> Result<Room> {
        if room.is_closed() {
            return Err(Error::RoomClosed);
        }
        if !room.is_owner(user_id) {
            return Err(Error::NotAuthorized("Only the room owner can reorder the queue".to_string()));
        }
        let from = room
            .queue_position(source_id)
            .ok_or_else(|| Error::TrackNotFound(source_id.to_string()))?;

        let mut next = room.clone();
        let track = next.queue.remove(from);
        let to = to_index.min(next.queue.len());
        next.queue.insert(to, track);
        Ok(next)
    }
}

fn ensure_member(room: &Room, user_id: &UserId) -> Result<()> {
    if room.is_closed() {
        return Err(Error::RoomClosed);
    }
    if !room.is_member(user_id) {
        return Err(Error::NotMember);
    }
    Ok(())
}
